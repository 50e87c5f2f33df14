// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use smc_adapters::{CondaError, FetchError, TrackingError};
use smc_core::ProjectError;
use thiserror::Error;

use crate::capture::CaptureError;
use crate::checks::CheckError;

/// Any failure of the training workflow. Every variant is fatal.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("code download failed: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Check(#[from] CheckError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error("conda env update failed: {0}")]
    Sync(#[source] CondaError),
    #[error("conda env info failed: {0}")]
    EnvInfo(#[source] CondaError),
    #[error("conda info has no string '{key}' entry")]
    MissingEnvPrefix { key: String },
    #[error("tracking store error: {0}")]
    Tracking(#[from] TrackingError),
    #[error("mlflow run {run_id} failed: {source}")]
    Training {
        run_id: String,
        #[source]
        source: CondaError,
    },
    #[error(transparent)]
    Capture(#[from] CaptureError),
}
