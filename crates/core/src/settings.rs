// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed names shared by the training workflow.
//!
//! Every component receives a [`Settings`] instead of reaching for module-level
//! constants, so tests can swap any of them without touching process state.

/// Conda environment used when `CONDA_TRAINING_ENV` is not set.
pub const DEFAULT_CONDA_ENV: &str = "training";

/// Hyperparameter prefix for arguments of `mlflow run` itself.
pub const RUN_PARAMS_PREFIX: &str = "sagemaker_mlflow_run_";

/// Run-control parameter selecting an existing MLflow run.
pub const RUN_ID_PARAM: &str = "run-id";

/// Subdirectory of the model dir receiving the run artifacts.
pub const MODEL_SUBDIR: &str = "mlflow_run_artifacts";

/// Key in `conda info --json` holding the active environment prefix.
pub const CONDA_PREFIX_KEY: &str = "active_prefix";

/// MLproject file name, matched case-insensitively.
pub const MLPROJECT_FILE_NAME: &str = "mlproject";

/// Dependency file used when MLproject has no `conda_env` entry.
pub const DEFAULT_CONDA_FILE: &str = "conda.yaml";

/// Flag marker preceding each `key=value` project parameter.
pub const HYPER_PARAM_FLAG: &str = "-P";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Name of the pre-created conda environment that runs training.
    pub conda_env: String,
    pub run_params_prefix: String,
    pub run_id_param: String,
    pub model_subdir: String,
    pub conda_prefix_key: String,
    pub mlproject_file_name: String,
    pub default_conda_file: String,
    pub hyper_param_flag: String,
}

impl Settings {
    /// Settings with defaults for everything except the environment name.
    pub fn with_conda_env(conda_env: impl Into<String>) -> Self {
        Self { conda_env: conda_env.into(), ..Self::default() }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            conda_env: DEFAULT_CONDA_ENV.to_string(),
            run_params_prefix: RUN_PARAMS_PREFIX.to_string(),
            run_id_param: RUN_ID_PARAM.to_string(),
            model_subdir: MODEL_SUBDIR.to_string(),
            conda_prefix_key: CONDA_PREFIX_KEY.to_string(),
            mlproject_file_name: MLPROJECT_FILE_NAME.to_string(),
            default_conda_file: DEFAULT_CONDA_FILE.to_string(),
            hyper_param_flag: HYPER_PARAM_FLAG.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
