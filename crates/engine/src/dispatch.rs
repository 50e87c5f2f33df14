// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run dispatch: `conda run -n <env> mlflow run ...` under a tracking run.

use std::path::{Path, PathBuf};

use smc_adapters::{CondaAdapter, RunStatus, TrackingAdapter};
use smc_core::{copy_environ_and_prepend_path, hyper_param_args, run_param_args, Params, Settings};

use crate::error::TrainError;

/// `mlflow run` option naming the tracking run to log into
pub const RUN_ID_OPTION: &str = "--run-id";

/// `bin` directory of the training environment, from `conda info --json`.
///
/// `conda run` does not put the env's own binaries first on `PATH`, so the
/// training command is launched with this directory prepended.
pub async fn env_bin_path<C: CondaAdapter>(conda: &C, settings: &Settings) -> Result<PathBuf, TrainError> {
    let info = conda.info_json(&settings.conda_env).await.map_err(TrainError::EnvInfo)?;
    let prefix = info
        .get(&settings.conda_prefix_key)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| TrainError::MissingEnvPrefix { key: settings.conda_prefix_key.clone() })?;
    Ok(Path::new(prefix).join("bin"))
}

/// Full argument list passed to `conda run -n <env>`.
///
/// Run-control flags come before hyper-parameters; the project directory is
/// always last.
pub fn mlflow_run_args(
    run_params: &Params,
    hyperparameters: &Params,
    run_id: &str,
    project_dir: &Path,
    settings: &Settings,
) -> Vec<String> {
    let mut args = vec!["mlflow".to_string(), "run".to_string()];
    args.extend(run_param_args(run_params));
    args.extend(hyper_param_args(hyperparameters, &settings.hyper_param_flag));
    args.push(RUN_ID_OPTION.to_string());
    args.push(run_id.to_string());
    args.push(project_dir.to_string_lossy().into_owned());
    args
}

/// Run the MLflow project in `project_dir` and return the tracking run id.
///
/// A `run-id` run-control parameter resumes that run; otherwise a new run is
/// created. The run is ended FINISHED on success and FAILED when the
/// training command fails.
pub async fn run_training<C, T>(
    conda: &C,
    tracking: &T,
    settings: &Settings,
    project_dir: &Path,
    hyperparameters: &Params,
    mut run_params: Params,
) -> Result<String, TrainError>
where
    C: CondaAdapter,
    T: TrackingAdapter,
{
    let bin_path = env_bin_path(conda, settings).await?;
    let envs = copy_environ_and_prepend_path(bin_path.as_os_str());

    let requested = match run_params.shift_remove(&settings.run_id_param) {
        Some(value) if value.is_flag() => {
            tracing::warn!(param = %settings.run_id_param, "run id parameter has no value; starting a new run");
            None
        }
        Some(value) => Some(value.to_string()),
        None => None,
    };
    let run = tracking.start_run(requested.as_deref()).await?;
    let run_id = run.run_id;

    let args = mlflow_run_args(&run_params, hyperparameters, &run_id, project_dir, settings);
    tracing::info!(%run_id, bin = %bin_path.display(), "starting mlflow run");

    if let Err(source) = conda.run_in_env(&settings.conda_env, &args, &envs).await {
        if let Err(e) = tracking.end_run(&run_id, RunStatus::Failed).await {
            tracing::warn!(%run_id, error = %e, "failed to mark run as failed");
        }
        return Err(TrainError::Training { run_id, source });
    }

    tracking.end_run(&run_id, RunStatus::Finished).await?;
    tracing::info!(%run_id, "mlflow run finished");
    Ok(run_id)
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
