// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the binary.
//!
//! Library crates never read the process environment for configuration;
//! everything they need is resolved here and passed in.

use std::path::PathBuf;

use smc_adapters::{RestAuth, TrackingConfig};
use smc_core::settings::DEFAULT_CONDA_ENV;
use smc_core::training_env::DEFAULT_BASE_DIR;

/// Version string: `<crate version>+<git hash>`
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

const DEFAULT_CONDA_BIN: &str = "conda";
const DEFAULT_LOG_FILTER: &str = "info";
const UNKNOWN_USER: &str = "unknown";

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Conda environment that runs training: `CONDA_TRAINING_ENV` > `training`
pub fn conda_env() -> String {
    non_empty("CONDA_TRAINING_ENV").unwrap_or_else(|| DEFAULT_CONDA_ENV.to_string())
}

/// Container base directory: `SAGEMAKER_BASE_DIR` > `/opt/ml`
pub fn base_dir() -> PathBuf {
    PathBuf::from(non_empty("SAGEMAKER_BASE_DIR").unwrap_or_else(|| DEFAULT_BASE_DIR.to_string()))
}

/// Conda executable: `SMC_CONDA_BIN` > `conda` on `PATH`
pub fn conda_bin() -> PathBuf {
    PathBuf::from(non_empty("SMC_CONDA_BIN").unwrap_or_else(|| DEFAULT_CONDA_BIN.to_string()))
}

/// Tracing filter directive: `SMC_LOG` > `info`
pub fn log_filter() -> String {
    non_empty("SMC_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

/// User recorded on new runs: `USER` > `LOGNAME` > `unknown`
pub fn user() -> String {
    non_empty("USER").or_else(|| non_empty("LOGNAME")).unwrap_or_else(|| UNKNOWN_USER.to_string())
}

/// Tracking server credentials. A token takes precedence over basic auth.
pub fn tracking_auth() -> RestAuth {
    if let Some(token) = non_empty("MLFLOW_TRACKING_TOKEN") {
        return RestAuth::Bearer(token);
    }
    match non_empty("MLFLOW_TRACKING_USERNAME") {
        Some(username) => RestAuth::Basic { username, password: non_empty("MLFLOW_TRACKING_PASSWORD") },
        None => RestAuth::None,
    }
}

/// Tracking store settings from the `MLFLOW_*` variables.
pub fn tracking_config(cwd: PathBuf) -> TrackingConfig {
    TrackingConfig {
        uri: non_empty("MLFLOW_TRACKING_URI"),
        experiment_id: non_empty("MLFLOW_EXPERIMENT_ID"),
        user: user(),
        auth: tracking_auth(),
        cwd,
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
