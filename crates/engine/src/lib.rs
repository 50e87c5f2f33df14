// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! smc-engine: the SageMaker training workflow for MLflow projects

pub mod capture;
pub mod checks;
pub mod dispatch;
mod error;
pub mod sync;
mod trainer;

pub use capture::{save_results, CaptureError};
pub use checks::{check_env, CheckError};
pub use dispatch::{env_bin_path, mlflow_run_args, run_training};
pub use error::TrainError;
pub use sync::update_conda_env;
pub use trainer::{Trainer, TrainerDeps};
