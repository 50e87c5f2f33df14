// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `smc check` — verify the container without training.

use anyhow::Result;
use clap::Args;
use smc_adapters::CondaCli;

use crate::env;
use crate::exit_error::ExitError;

#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Conda environment to verify [env: CONDA_TRAINING_ENV] [default: training]
    #[arg(long)]
    pub conda_env: Option<String>,
}

pub async fn handle(args: CheckArgs) -> Result<()> {
    let conda_env = args.conda_env.unwrap_or_else(env::conda_env);
    let conda = CondaCli::new(env::conda_bin());

    smc_engine::check_env(&conda, &conda_env)
        .await
        .map_err(|e| ExitError::failure(format!("environment check failed: {e}")))?;
    Ok(())
}
