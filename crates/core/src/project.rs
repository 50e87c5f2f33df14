// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MLproject discovery and dependency-file resolution.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::settings::Settings;

/// Errors from locating or reading the MLproject file
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("can't find MLproject file in the '{0}' dir")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid MLproject file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// The parts of an MLproject document this crate cares about.
///
/// Unknown keys (`entry_points`, `docker_env`, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MlProject {
    #[serde(default)]
    pub name: Option<String>,
    /// Dependency file path, relative to the project directory.
    #[serde(default)]
    pub conda_env: Option<String>,
}

impl MlProject {
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ProjectError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&content).map_err(|source| ProjectError::Yaml { path: path.to_path_buf(), source })
    }
}

/// Find the MLproject file in `project_dir` by case-insensitive name.
///
/// If several entries differ only by case, whichever `read_dir` yields first
/// wins; that order is filesystem-dependent.
pub fn find_mlproject_file(project_dir: &Path, file_name: &str) -> Result<PathBuf, ProjectError> {
    let entries = std::fs::read_dir(project_dir)
        .map_err(|source| ProjectError::Io { path: project_dir.to_path_buf(), source })?;
    for entry in entries.flatten() {
        if entry.file_name().to_string_lossy().to_lowercase() == file_name.to_lowercase() {
            return Ok(project_dir.join(entry.file_name()));
        }
    }
    Err(ProjectError::NotFound(project_dir.to_path_buf()))
}

/// Read the dependency file name from an MLproject file.
pub fn conda_file_name(mlproject_path: &Path, default: &str) -> Result<String, ProjectError> {
    let project = MlProject::load(mlproject_path)?;
    Ok(project.conda_env.unwrap_or_else(|| default.to_string()))
}

/// Resolve the dependency file for the project in `project_dir`.
///
/// The returned path is not checked for existence.
pub fn resolve_conda_file(project_dir: &Path, settings: &Settings) -> Result<PathBuf, ProjectError> {
    let mlproject = find_mlproject_file(project_dir, &settings.mlproject_file_name)?;
    let conda_file = conda_file_name(&mlproject, &settings.default_conda_file)?;
    Ok(project_dir.join(conda_file))
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
