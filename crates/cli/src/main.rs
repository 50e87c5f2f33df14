// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! smc: SageMaker training entry point for MLflow projects

mod commands;
mod env;
mod exit_error;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{check, train};
use crate::logging::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "smc", version = env::VERSION, about = "Run MLflow projects inside SageMaker training containers")]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download code, sync the conda env, run the project and save its artifacts
    Train(train::TrainArgs),
    /// Verify conda, the training env and mlflow
    Check(check::CheckArgs),
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Train(args) => train::handle(args).await,
        Command::Check(args) => check::handle(args).await,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&env::log_filter(), cli.log_format) {
        eprintln!("smc: {e}");
        std::process::exit(exit_error::FAILURE);
    }

    if let Err(err) = run(cli).await {
        tracing::error!(error = %format!("{err:#}"), "smc failed");
        std::process::exit(exit_error::exit_code(&err));
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
