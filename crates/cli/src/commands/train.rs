// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `smc train` — run the MLflow project for this training job.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use smc_adapters::{tracking_store, CondaCli, ShellCodeFetcher};
use smc_core::{SageMakerPaths, Settings, TrainingEnv};
use smc_engine::{Trainer, TrainerDeps};

use crate::env;
use crate::exit_error::ExitError;

#[derive(Args, Debug, Default)]
pub struct TrainArgs {
    /// Container base directory [env: SAGEMAKER_BASE_DIR] [default: /opt/ml]
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Conda environment to train in [env: CONDA_TRAINING_ENV] [default: training]
    #[arg(long)]
    pub conda_env: Option<String>,
}

pub async fn handle(args: TrainArgs) -> Result<()> {
    let settings = Settings::with_conda_env(args.conda_env.unwrap_or_else(env::conda_env));
    let paths = SageMakerPaths::new(args.base_dir.unwrap_or_else(env::base_dir));

    let training_env = TrainingEnv::load(&paths).context("failed to read training environment")?;
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let tracking = tracking_store(&env::tracking_config(cwd)).context("failed to open tracking store")?;

    let trainer = Trainer::new(
        TrainerDeps { conda: CondaCli::new(env::conda_bin()), tracking, fetcher: ShellCodeFetcher::new() },
        settings,
    );
    let run_id = trainer
        .train(&training_env)
        .await
        .map_err(|e| ExitError::failure(format!("training failed: {e}")))?;

    tracing::info!(%run_id, model_dir = %training_env.model_dir.display(), "done");
    Ok(())
}
