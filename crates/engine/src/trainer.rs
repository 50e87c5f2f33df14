// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Training workflow.
//!
//! One invocation runs these steps in order and stops at the first error:
//!
//! 1. download the code bundle into `code_dir`
//! 2. verify conda, the training env, and mlflow
//! 3. update the training env from the project's conda file
//! 4. `mlflow run` the project under a tracking run
//! 5. copy the run's artifacts into `model_dir`
//!
//! There is no resumption: a failed invocation is retried from scratch.

use std::time::Instant;

use smc_adapters::{CodeFetcher, CondaAdapter, TrackingAdapter};
use smc_core::{split_run_params, Settings, TrainingEnv};

use crate::capture::save_results;
use crate::checks::{check_env, CheckError};
use crate::dispatch::run_training;
use crate::error::TrainError;
use crate::sync::update_conda_env;

/// Adapters used by the trainer
pub struct TrainerDeps<C, T, F> {
    pub conda: C,
    pub tracking: T,
    pub fetcher: F,
}

/// Runs MLflow projects inside a SageMaker training container
pub struct Trainer<C, T, F> {
    conda: C,
    tracking: T,
    fetcher: F,
    settings: Settings,
}

impl<C, T, F> Trainer<C, T, F>
where
    C: CondaAdapter,
    T: TrackingAdapter,
    F: CodeFetcher,
{
    pub fn new(deps: TrainerDeps<C, T, F>, settings: Settings) -> Self {
        Self { conda: deps.conda, tracking: deps.tracking, fetcher: deps.fetcher, settings }
    }

    /// Verify the container without training.
    pub async fn check(&self) -> Result<(), CheckError> {
        check_env(&self.conda, &self.settings.conda_env).await
    }

    /// Run the full workflow and return the tracking run id.
    pub async fn train(&self, env: &TrainingEnv) -> Result<String, TrainError> {
        let start = Instant::now();

        match &env.module_dir {
            Some(uri) => {
                tracing::info!(%uri, "downloading code");
                self.fetcher.download_and_extract(uri, &env.code_dir).await?;
            }
            None => tracing::info!(dir = %env.code_dir.display(), "no code location given; using code dir as is"),
        }

        tracing::info!("checking environment");
        self.check().await?;

        tracing::info!(env = %self.settings.conda_env, "updating conda env using MLproject dependencies");
        update_conda_env(&self.conda, &env.code_dir, &self.settings).await?;

        tracing::info!("running training");
        let run_params = split_run_params(&env.additional_framework_parameters, &self.settings.run_params_prefix);
        let run_id = run_training(
            &self.conda,
            &self.tracking,
            &self.settings,
            &env.code_dir,
            &env.hyperparameters,
            run_params,
        )
        .await?;

        tracing::info!(%run_id, "saving results");
        save_results(&self.tracking, &run_id, &env.model_dir, &self.settings).await?;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info!(%run_id, elapsed_ms, "training completed");
        Ok(run_id)
    }
}

#[cfg(test)]
#[path = "trainer_tests.rs"]
mod tests;
