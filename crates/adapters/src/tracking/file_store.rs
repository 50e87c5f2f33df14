// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local MLflow file store.
//!
//! Layout, rooted at the tracking directory:
//!
//! ```text
//! <root>/<experiment_id>/meta.yaml
//! <root>/<experiment_id>/<run_id>/meta.yaml
//! <root>/<experiment_id>/<run_id>/{artifacts,metrics,params,tags}/
//! ```
//!
//! `mlflow run --run-id <id>` inside the conda environment reopens the run
//! created here and logs into the same directories.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use smc_core::{Clock, SystemClock};

use super::{RunInfo, RunStatus, TrackingAdapter, TrackingError, DEFAULT_EXPERIMENT_ID};

const META_FILE: &str = "meta.yaml";
const ACTIVE: &str = "active";
const SOURCE_TYPE_LOCAL: i32 = 4;
const TRASH_DIR: &str = ".trash";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ExperimentMeta {
    artifact_location: String,
    experiment_id: String,
    lifecycle_stage: String,
    name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RunMeta {
    artifact_uri: String,
    end_time: Option<u64>,
    entry_point_name: String,
    experiment_id: String,
    lifecycle_stage: String,
    name: String,
    run_id: String,
    run_uuid: String,
    source_name: String,
    source_type: i32,
    source_version: String,
    start_time: u64,
    status: i32,
    tags: Vec<String>,
    user_id: String,
    /// Keys written by other MLflow versions (`run_name`, `deleted_time`, ...)
    #[serde(flatten)]
    extra: serde_yaml::Mapping,
}

impl RunMeta {
    fn info(&self, path: &Path) -> Result<RunInfo, TrackingError> {
        let status = RunStatus::from_code(self.status).ok_or_else(|| TrackingError::Meta {
            path: path.to_path_buf(),
            source: serde::de::Error::custom(format!("unknown run status {}", self.status)),
        })?;
        Ok(RunInfo {
            run_id: self.run_id.clone(),
            experiment_id: self.experiment_id.clone(),
            artifact_uri: self.artifact_uri.clone(),
            status,
        })
    }
}

/// MLflow tracking store on the local filesystem
#[derive(Debug, Clone)]
pub struct FileStore<C: Clock = SystemClock> {
    root: PathBuf,
    experiment_id: String,
    user: String,
    clock: C,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, experiment_id: impl Into<String>, user: impl Into<String>) -> Self {
        Self::with_clock(root, experiment_id, user, SystemClock)
    }
}

impl<C: Clock> FileStore<C> {
    pub fn with_clock(
        root: impl Into<PathBuf>,
        experiment_id: impl Into<String>,
        user: impl Into<String>,
        clock: C,
    ) -> Self {
        Self { root: root.into(), experiment_id: experiment_id.into(), user: user.into(), clock }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Experiment metadata, creating the default experiment on first use.
    async fn experiment(&self) -> Result<ExperimentMeta, TrackingError> {
        let dir = self.root.join(&self.experiment_id);
        let meta_path = dir.join(META_FILE);
        if tokio::fs::try_exists(&meta_path).await.unwrap_or(false) {
            return read_yaml(&meta_path).await;
        }
        if self.experiment_id != DEFAULT_EXPERIMENT_ID {
            return Err(TrackingError::ExperimentNotFound(self.experiment_id.clone()));
        }

        create_dir(&dir).await?;
        let meta = ExperimentMeta {
            artifact_location: format!("file://{}", dir.display()),
            experiment_id: DEFAULT_EXPERIMENT_ID.to_string(),
            lifecycle_stage: ACTIVE.to_string(),
            name: "Default".to_string(),
        };
        write_yaml(&meta_path, &meta).await?;
        tracing::info!(root = %self.root.display(), "created default experiment");
        Ok(meta)
    }

    /// Locate `<root>/<experiment>/<run_id>/meta.yaml` in any experiment.
    async fn find_run(&self, run_id: &str) -> Result<PathBuf, TrackingError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TrackingError::RunNotFound(run_id.to_string()))
            }
            Err(source) => return Err(TrackingError::Io { path: self.root.clone(), source }),
        };
        while let Some(entry) =
            entries.next_entry().await.map_err(|source| TrackingError::Io { path: self.root.clone(), source })?
        {
            if entry.file_name() == TRASH_DIR {
                continue;
            }
            let candidate = entry.path().join(run_id).join(META_FILE);
            if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                return Ok(candidate);
            }
        }
        Err(TrackingError::RunNotFound(run_id.to_string()))
    }

    async fn create_run(&self) -> Result<RunInfo, TrackingError> {
        let experiment = self.experiment().await?;
        let run_id = uuid::Uuid::new_v4().simple().to_string();
        let run_dir = self.root.join(&experiment.experiment_id).join(&run_id);
        for sub in ["artifacts", "metrics", "params", "tags"] {
            create_dir(&run_dir.join(sub)).await?;
        }

        let meta = RunMeta {
            artifact_uri: format!("{}/{run_id}/artifacts", experiment.artifact_location.trim_end_matches('/')),
            end_time: None,
            entry_point_name: String::new(),
            experiment_id: experiment.experiment_id.clone(),
            lifecycle_stage: ACTIVE.to_string(),
            name: String::new(),
            run_id: run_id.clone(),
            run_uuid: run_id.clone(),
            source_name: String::new(),
            source_type: SOURCE_TYPE_LOCAL,
            source_version: String::new(),
            start_time: self.clock.epoch_ms(),
            status: RunStatus::Running.code(),
            tags: Vec::new(),
            user_id: self.user.clone(),
            extra: serde_yaml::Mapping::new(),
        };
        let meta_path = run_dir.join(META_FILE);
        write_yaml(&meta_path, &meta).await?;
        write_text(&run_dir.join("tags").join("mlflow.user"), &self.user).await?;

        tracing::info!(%run_id, experiment_id = %experiment.experiment_id, "created run");
        meta.info(&meta_path)
    }

    async fn update_run(
        &self,
        run_id: &str,
        update: impl FnOnce(&mut RunMeta),
    ) -> Result<RunInfo, TrackingError> {
        let meta_path = self.find_run(run_id).await?;
        let mut meta: RunMeta = read_yaml(&meta_path).await?;
        update(&mut meta);
        write_yaml(&meta_path, &meta).await?;
        meta.info(&meta_path)
    }
}

#[async_trait]
impl<C: Clock> TrackingAdapter for FileStore<C> {
    async fn start_run(&self, run_id: Option<&str>) -> Result<RunInfo, TrackingError> {
        match run_id {
            None => self.create_run().await,
            Some(id) => {
                let info = self
                    .update_run(id, |meta| {
                        meta.status = RunStatus::Running.code();
                        meta.end_time = None;
                    })
                    .await?;
                tracing::info!(run_id = %id, "resumed run");
                Ok(info)
            }
        }
    }

    async fn end_run(&self, run_id: &str, status: RunStatus) -> Result<(), TrackingError> {
        let now = self.clock.epoch_ms();
        self.update_run(run_id, |meta| {
            meta.status = status.code();
            meta.end_time = Some(now);
        })
        .await?;
        Ok(())
    }

    async fn get_run(&self, run_id: &str) -> Result<RunInfo, TrackingError> {
        let meta_path = self.find_run(run_id).await?;
        let meta: RunMeta = read_yaml(&meta_path).await?;
        meta.info(&meta_path)
    }
}

async fn create_dir(path: &Path) -> Result<(), TrackingError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| TrackingError::Io { path: path.to_path_buf(), source })
}

async fn write_text(path: &Path, text: &str) -> Result<(), TrackingError> {
    tokio::fs::write(path, text)
        .await
        .map_err(|source| TrackingError::Io { path: path.to_path_buf(), source })
}

async fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, TrackingError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| TrackingError::Io { path: path.to_path_buf(), source })?;
    serde_yaml::from_str(&text).map_err(|source| TrackingError::Meta { path: path.to_path_buf(), source })
}

async fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), TrackingError> {
    let text = serde_yaml::to_string(value)
        .map_err(|source| TrackingError::Meta { path: path.to_path_buf(), source })?;
    write_text(path, &text).await
}

#[cfg(test)]
#[path = "file_store_tests.rs"]
mod tests;
