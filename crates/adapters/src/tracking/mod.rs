// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MLflow tracking store adapters.
//!
//! The workflow needs three things from MLflow: open (or reopen) a run, close
//! it with a final status, and look up where its artifacts were written.
//! Which store serves those calls follows `MLFLOW_TRACKING_URI`:
//!
//! ```text
//! unset / path / file://...   local file store (`./mlruns` by default)
//! http:// / https://          tracking server REST API
//! ```

mod file_store;
mod rest;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use file_store::FileStore;
pub use rest::{RestAuth, RestStore};

/// Experiment used for new runs when none is configured.
pub const DEFAULT_EXPERIMENT_ID: &str = "0";

/// Errors from tracking store operations
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("run '{0}' not found")]
    RunNotFound(String),
    #[error("experiment '{0}' not found")]
    ExperimentNotFound(String),
    #[error("unsupported tracking uri '{0}'")]
    UnsupportedUri(String),
    #[error("tracking store io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid metadata in {path}: {source}")]
    Meta {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("tracking server request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("tracking server returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Lifecycle state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,
    Scheduled,
    Finished,
    Failed,
    Killed,
}

impl RunStatus {
    /// Numeric code used by the file store's `meta.yaml`.
    pub fn code(self) -> i32 {
        match self {
            RunStatus::Running => 1,
            RunStatus::Scheduled => 2,
            RunStatus::Finished => 3,
            RunStatus::Failed => 4,
            RunStatus::Killed => 5,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(RunStatus::Running),
            2 => Some(RunStatus::Scheduled),
            3 => Some(RunStatus::Finished),
            4 => Some(RunStatus::Failed),
            5 => Some(RunStatus::Killed),
            _ => None,
        }
    }
}

/// What the workflow needs to know about a run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunInfo {
    pub run_id: String,
    pub experiment_id: String,
    pub artifact_uri: String,
    pub status: RunStatus,
}

/// Adapter for an MLflow tracking store
#[async_trait]
pub trait TrackingAdapter: Clone + Send + Sync + 'static {
    /// Create a new run, or reopen `run_id` and mark it running.
    async fn start_run(&self, run_id: Option<&str>) -> Result<RunInfo, TrackingError>;

    /// Mark the run terminated with `status`.
    async fn end_run(&self, run_id: &str, status: RunStatus) -> Result<(), TrackingError>;

    async fn get_run(&self, run_id: &str) -> Result<RunInfo, TrackingError>;
}

/// Tracking store settings, read from the process environment by the binary.
#[derive(Debug, Clone, Default)]
pub struct TrackingConfig {
    /// `MLFLOW_TRACKING_URI`
    pub uri: Option<String>,
    /// `MLFLOW_EXPERIMENT_ID`; [`DEFAULT_EXPERIMENT_ID`] when unset.
    pub experiment_id: Option<String>,
    /// Recorded as the run's user.
    pub user: String,
    pub auth: RestAuth,
    /// Base for relative file store paths.
    pub cwd: PathBuf,
}

impl TrackingConfig {
    fn experiment_id(&self) -> String {
        self.experiment_id.clone().unwrap_or_else(|| DEFAULT_EXPERIMENT_ID.to_string())
    }
}

/// Tracking store selected by URI. Dispatches to the matching backend.
#[derive(Clone)]
pub enum TrackingStore {
    File(FileStore),
    Rest(RestStore),
}

/// Build the tracking store described by `config`.
pub fn tracking_store(config: &TrackingConfig) -> Result<TrackingStore, TrackingError> {
    let uri = config.uri.as_deref().map(str::trim).filter(|u| !u.is_empty());
    let root = match uri {
        None => config.cwd.join("mlruns"),
        Some(uri) => match uri.split_once("://") {
            Some((scheme, _)) if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") => {
                return Ok(TrackingStore::Rest(RestStore::new(
                    uri,
                    config.experiment_id(),
                    config.user.clone(),
                    config.auth.clone(),
                )?));
            }
            Some((scheme, _)) if scheme.eq_ignore_ascii_case("file") => {
                smc_core::ArtifactLocation::parse(uri)
                    .map_err(|_| TrackingError::UnsupportedUri(uri.to_string()))?
                    .local_path()
                    .to_path_buf()
            }
            Some(_) => return Err(TrackingError::UnsupportedUri(uri.to_string())),
            None if uri.starts_with("databricks") => {
                return Err(TrackingError::UnsupportedUri(uri.to_string()))
            }
            None => config.cwd.join(uri),
        },
    };
    Ok(TrackingStore::File(FileStore::new(root, config.experiment_id(), config.user.clone())))
}

#[async_trait]
impl TrackingAdapter for TrackingStore {
    async fn start_run(&self, run_id: Option<&str>) -> Result<RunInfo, TrackingError> {
        match self {
            TrackingStore::File(store) => store.start_run(run_id).await,
            TrackingStore::Rest(store) => store.start_run(run_id).await,
        }
    }

    async fn end_run(&self, run_id: &str, status: RunStatus) -> Result<(), TrackingError> {
        match self {
            TrackingStore::File(store) => store.end_run(run_id, status).await,
            TrackingStore::Rest(store) => store.end_run(run_id, status).await,
        }
    }

    async fn get_run(&self, run_id: &str) -> Result<RunInfo, TrackingError> {
        match self {
            TrackingStore::File(store) => store.get_run(run_id).await,
            TrackingStore::Rest(store) => store.get_run(run_id).await,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{RunInfo, RunStatus, TrackingAdapter, TrackingError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    /// Recorded tracking call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum TrackingCall {
        StartRun { run_id: Option<String> },
        EndRun { run_id: String, status: RunStatus },
        GetRun { run_id: String },
    }

    struct FakeTrackingState {
        calls: Vec<TrackingCall>,
        runs: HashMap<String, RunInfo>,
        next_id: u32,
        artifact_root: String,
    }

    /// Fake tracking adapter for testing.
    ///
    /// Runs get ids `run-1`, `run-2`, ... and artifact URIs under a
    /// configurable root (`file:///tmp/mlruns` by default).
    #[derive(Clone)]
    pub struct FakeTrackingAdapter {
        inner: Arc<Mutex<FakeTrackingState>>,
    }

    impl Default for FakeTrackingAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeTrackingState {
                    calls: Vec::new(),
                    runs: HashMap::new(),
                    next_id: 1,
                    artifact_root: "file:///tmp/mlruns".to_string(),
                })),
            }
        }
    }

    impl FakeTrackingAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Put run artifacts under a local directory.
        pub fn with_artifact_dir(self, dir: &Path) -> Self {
            self.inner.lock().artifact_root = format!("file://{}", dir.display());
            self
        }

        /// Put run artifacts under an arbitrary URI root (e.g. `s3://bucket`).
        pub fn with_artifact_root(self, root: &str) -> Self {
            self.inner.lock().artifact_root = root.to_string();
            self
        }

        /// Register an existing run.
        pub fn add_run(&self, run_id: &str, status: RunStatus) {
            let mut inner = self.inner.lock();
            let info = RunInfo {
                run_id: run_id.to_string(),
                experiment_id: "0".to_string(),
                artifact_uri: format!("{}/{run_id}/artifacts", inner.artifact_root),
                status,
            };
            inner.runs.insert(run_id.to_string(), info);
        }

        /// Local artifact directory for `run_id`, if the root is a file URI.
        pub fn artifact_dir(&self, run_id: &str) -> Option<PathBuf> {
            let inner = self.inner.lock();
            inner
                .artifact_root
                .strip_prefix("file://")
                .map(|root| PathBuf::from(root).join(run_id).join("artifacts"))
        }

        pub fn run(&self, run_id: &str) -> Option<RunInfo> {
            self.inner.lock().runs.get(run_id).cloned()
        }

        /// Get all recorded calls
        pub fn calls(&self) -> Vec<TrackingCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl TrackingAdapter for FakeTrackingAdapter {
        async fn start_run(&self, run_id: Option<&str>) -> Result<RunInfo, TrackingError> {
            let mut inner = self.inner.lock();
            inner.calls.push(TrackingCall::StartRun { run_id: run_id.map(str::to_string) });
            let run_id = match run_id {
                Some(id) => {
                    let run = inner
                        .runs
                        .get_mut(id)
                        .ok_or_else(|| TrackingError::RunNotFound(id.to_string()))?;
                    run.status = RunStatus::Running;
                    return Ok(run.clone());
                }
                None => {
                    let id = format!("run-{}", inner.next_id);
                    inner.next_id += 1;
                    id
                }
            };
            let info = RunInfo {
                run_id: run_id.clone(),
                experiment_id: "0".to_string(),
                artifact_uri: format!("{}/{run_id}/artifacts", inner.artifact_root),
                status: RunStatus::Running,
            };
            inner.runs.insert(run_id, info.clone());
            Ok(info)
        }

        async fn end_run(&self, run_id: &str, status: RunStatus) -> Result<(), TrackingError> {
            let mut inner = self.inner.lock();
            inner.calls.push(TrackingCall::EndRun { run_id: run_id.to_string(), status });
            let run = inner
                .runs
                .get_mut(run_id)
                .ok_or_else(|| TrackingError::RunNotFound(run_id.to_string()))?;
            run.status = status;
            Ok(())
        }

        async fn get_run(&self, run_id: &str) -> Result<RunInfo, TrackingError> {
            let mut inner = self.inner.lock();
            inner.calls.push(TrackingCall::GetRun { run_id: run_id.to_string() });
            inner.runs.get(run_id).cloned().ok_or_else(|| TrackingError::RunNotFound(run_id.to_string()))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTrackingAdapter, TrackingCall};

#[cfg(test)]
#[path = "../tracking_tests.rs"]
mod tests;
