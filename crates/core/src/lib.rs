// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! smc-core: domain types for running MLflow projects inside SageMaker
//! training containers.

pub mod artifact;
pub mod clock;
pub mod environ;
pub mod params;
pub mod project;
pub mod settings;
pub mod training_env;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use artifact::{ArtifactLocation, ArtifactLocationError};
pub use clock::{Clock, FakeClock, SystemClock};
pub use environ::{copy_environ_and_prepend_path, prepend_path, PATH_VAR};
pub use params::{hyper_param_args, run_param_args, split_run_params, ParamValue, Params};
pub use project::{conda_file_name, find_mlproject_file, resolve_conda_file, MlProject, ProjectError};
pub use settings::Settings;
pub use training_env::{SageMakerPaths, TrainingEnv, TrainingEnvError};
