// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact location URIs reported by the tracking store.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArtifactLocationError {
    #[error("only local artifact storage is supported, got {scheme:?} in '{uri}'")]
    UnsupportedScheme { uri: String, scheme: Option<String> },
    #[error("artifact uri '{0}' has no path")]
    EmptyPath(String),
}

/// Where a run's artifacts live. Only local directories are supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactLocation {
    Local(PathBuf),
}

impl ArtifactLocation {
    /// Parse an artifact URI.
    ///
    /// `file://[host]/path` yields the path; the authority part is ignored.
    /// Anything without a `file` scheme, including bare paths, is rejected.
    pub fn parse(uri: &str) -> Result<Self, ArtifactLocationError> {
        let unsupported = |scheme: Option<&str>| ArtifactLocationError::UnsupportedScheme {
            uri: uri.to_string(),
            scheme: scheme.map(str::to_string),
        };

        let (scheme, rest) = uri.split_once("://").ok_or_else(|| unsupported(None))?;
        if !scheme.eq_ignore_ascii_case("file") {
            return Err(unsupported(Some(scheme)));
        }

        let rest = rest.split(['?', '#']).next().unwrap_or_default();
        let path = match rest.find('/') {
            Some(idx) => &rest[idx..],
            None => return Err(ArtifactLocationError::EmptyPath(uri.to_string())),
        };
        Ok(ArtifactLocation::Local(PathBuf::from(path)))
    }

    pub fn local_path(&self) -> &std::path::Path {
        match self {
            ArtifactLocation::Local(path) => path,
        }
    }
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
