// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container preconditions.
//!
//! The image must ship conda, a pre-created training environment, and
//! mlflow inside that environment. Each check runs once per invocation and
//! a failure stops the workflow.

use smc_adapters::{CondaAdapter, CondaError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("conda is not installed: {0}")]
    CondaIsNotInstalled(#[source] CondaError),
    #[error("conda env '{env}' is not created: {source}")]
    CondaTrainingEnvIsNotCreated {
        env: String,
        #[source]
        source: CondaError,
    },
    #[error("mlflow is not installed in conda env '{env}': {source}")]
    MlflowIsNotInstalledInConda {
        env: String,
        #[source]
        source: CondaError,
    },
}

impl CheckError {
    /// Stderr captured from the failing conda command.
    pub fn stderr(&self) -> &str {
        match self {
            CheckError::CondaIsNotInstalled(source)
            | CheckError::CondaTrainingEnvIsNotCreated { source, .. }
            | CheckError::MlflowIsNotInstalledInConda { source, .. } => source.stderr(),
        }
    }
}

/// Verify conda, the training environment, and mlflow inside it, in that order.
pub async fn check_env<C: CondaAdapter>(conda: &C, env: &str) -> Result<(), CheckError> {
    let version = conda.version().await.map_err(CheckError::CondaIsNotInstalled)?;
    tracing::info!(%version, "OK - conda binary found");

    conda
        .env_info(env)
        .await
        .map_err(|source| CheckError::CondaTrainingEnvIsNotCreated { env: env.to_string(), source })?;
    tracing::info!(env, "OK - conda env to run mlflow training found");

    let version = conda
        .mlflow_version(env)
        .await
        .map_err(|source| CheckError::MlflowIsNotInstalledInConda { env: env.to_string(), source })?;
    tracing::info!(env, %version, "OK - mlflow binary found");
    Ok(())
}

#[cfg(test)]
#[path = "checks_tests.rs"]
mod tests;
