// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency sync: install the project's conda file into the training env.

use std::path::{Path, PathBuf};

use smc_adapters::CondaAdapter;
use smc_core::{resolve_conda_file, Settings};

use crate::error::TrainError;

/// Update the training environment from the project's dependency file.
///
/// Runs on every invocation; there is no change detection. Returns the
/// dependency file that was applied.
pub async fn update_conda_env<C: CondaAdapter>(
    conda: &C,
    project_dir: &Path,
    settings: &Settings,
) -> Result<PathBuf, TrainError> {
    let conda_file = resolve_conda_file(project_dir, settings)?;
    tracing::info!(file = %conda_file.display(), "found MLproject conda file with dependencies");
    tracing::info!(env = %settings.conda_env, "updating conda env");

    conda.update_env(&settings.conda_env, &conda_file).await.map_err(TrainError::Sync)?;
    Ok(conda_file)
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
