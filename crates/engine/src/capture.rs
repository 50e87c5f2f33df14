// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact capture: copy a run's artifacts into the SageMaker model dir.

use std::path::{Path, PathBuf};

use smc_adapters::{copy_tree, CopyError, TrackingAdapter, TrackingError};
use smc_core::{ArtifactLocation, ArtifactLocationError, Settings};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// Remote artifact stores are not implemented.
    #[error(transparent)]
    UnsupportedScheme(#[from] ArtifactLocationError),
    #[error(transparent)]
    Tracking(#[from] TrackingError),
    #[error(transparent)]
    Copy(#[from] CopyError),
}

/// Copy the artifacts of `run_id` to `<output_dir>/<model_subdir>`.
///
/// The copy is not atomic: a failure part way leaves a partial tree behind.
pub async fn save_results<T: TrackingAdapter>(
    tracking: &T,
    run_id: &str,
    output_dir: &Path,
    settings: &Settings,
) -> Result<PathBuf, CaptureError> {
    let run = tracking.get_run(run_id).await?;
    let location = ArtifactLocation::parse(&run.artifact_uri)?;
    let dest = output_dir.join(&settings.model_subdir);

    let files = copy_tree(location.local_path(), &dest).await?;
    tracing::info!(run_id, dest = %dest.display(), files, "mlflow run artifacts copied");
    Ok(dest)
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
