// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SageMaker training-container contract.
//!
//! The platform mounts everything under a base directory (`/opt/ml`):
//!
//! ```text
//! /opt/ml/input/config/hyperparameters.json   estimator hyperparameters
//! /opt/ml/code/                               extracted training code
//! /opt/ml/model/                              packed into model.tar.gz on exit
//! ```
//!
//! Every value in `hyperparameters.json` is a string. The SageMaker SDK
//! JSON-encodes values before upload, so each one is decoded as JSON when
//! possible and kept as the raw string otherwise.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;

use crate::params::{ParamValue, Params};

pub const DEFAULT_BASE_DIR: &str = "/opt/ml";

/// Prefix of hyperparameters consumed by the container rather than the model.
pub const FRAMEWORK_PARAM_PREFIX: &str = "sagemaker_";

/// Framework parameter naming the training code location.
pub const SUBMIT_DIRECTORY_PARAM: &str = "sagemaker_submit_directory";

#[derive(Debug, Error)]
pub enum TrainingEnvError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid hyperparameters file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Well-known locations under the container base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SageMakerPaths {
    base_dir: PathBuf,
}

impl SageMakerPaths {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn hyperparameters_file(&self) -> PathBuf {
        self.base_dir.join("input/config/hyperparameters.json")
    }

    pub fn code_dir(&self) -> PathBuf {
        self.base_dir.join("code")
    }

    pub fn model_dir(&self) -> PathBuf {
        self.base_dir.join("model")
    }
}

impl Default for SageMakerPaths {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DIR)
    }
}

/// Everything the training workflow needs from the container.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingEnv {
    /// Code bundle location (`s3://`, `file://` or a local path). `None` when
    /// the code is baked into the image at `code_dir`.
    pub module_dir: Option<String>,
    /// Hyperparameters forwarded to the MLflow project.
    pub hyperparameters: Params,
    /// `sagemaker_*` parameters, including run-control ones.
    pub additional_framework_parameters: Params,
    pub code_dir: PathBuf,
    pub model_dir: PathBuf,
}

impl TrainingEnv {
    /// Load the environment from the container's config files.
    ///
    /// A missing hyperparameters file is treated as an empty mapping.
    pub fn load(paths: &SageMakerPaths) -> Result<Self, TrainingEnvError> {
        let path = paths.hyperparameters_file();
        let raw = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|source| TrainingEnvError::Json { path: path.clone(), source })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => IndexMap::new(),
            Err(source) => return Err(TrainingEnvError::Io { path, source }),
        };
        Ok(Self::from_raw_hyperparameters(raw, paths))
    }

    /// Build the environment from an undecoded hyperparameter mapping.
    pub fn from_raw_hyperparameters(
        raw: IndexMap<String, serde_json::Value>,
        paths: &SageMakerPaths,
    ) -> Self {
        let mut hyperparameters = Params::new();
        let mut framework = Params::new();
        for (key, value) in raw {
            let value = ParamValue::from(decode_value(value));
            if key.starts_with(FRAMEWORK_PARAM_PREFIX) {
                framework.insert(key, value);
            } else {
                hyperparameters.insert(key, value);
            }
        }

        let module_dir = framework
            .get(SUBMIT_DIRECTORY_PARAM)
            .and_then(ParamValue::as_str)
            .map(str::to_string);

        Self {
            module_dir,
            hyperparameters,
            additional_framework_parameters: framework,
            code_dir: paths.code_dir(),
            model_dir: paths.model_dir(),
        }
    }
}

fn decode_value(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::String(s) => {
            serde_json::from_str(&s).unwrap_or(serde_json::Value::String(s))
        }
        other => other,
    }
}

#[cfg(test)]
#[path = "training_env_tests.rs"]
mod tests;
