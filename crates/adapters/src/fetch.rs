// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Training code download.
//!
//! SageMaker hands the container a `sagemaker_submit_directory` URI pointing
//! at the user's code, normally a `sourcedir.tar.gz` in S3. Local training
//! runs point it at a directory or tarball on disk instead.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::fs::{self, CopyError};
use crate::subprocess::{self, SubprocessError};

const ARCHIVE_NAME: &str = "sourcedir.tar.gz";

/// Errors from fetching training code
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unsupported code location '{0}'")]
    UnsupportedScheme(String),
    #[error("code location {0} does not exist")]
    NotFound(PathBuf),
    #[error(transparent)]
    Command(#[from] SubprocessError),
    #[error(transparent)]
    Copy(#[from] CopyError),
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the code bundle lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSource {
    S3(String),
    Local(PathBuf),
}

impl CodeSource {
    pub fn parse(uri: &str) -> Result<Self, FetchError> {
        match uri.split_once("://") {
            None => Ok(CodeSource::Local(PathBuf::from(uri))),
            Some((scheme, _)) if scheme.eq_ignore_ascii_case("s3") => Ok(CodeSource::S3(uri.to_string())),
            Some((scheme, _)) if scheme.eq_ignore_ascii_case("file") => smc_core::ArtifactLocation::parse(uri)
                .map(|loc| CodeSource::Local(loc.local_path().to_path_buf()))
                .map_err(|_| FetchError::UnsupportedScheme(uri.to_string())),
            Some(_) => Err(FetchError::UnsupportedScheme(uri.to_string())),
        }
    }
}

/// Adapter that places the training code bundle into a directory
#[async_trait]
pub trait CodeFetcher: Clone + Send + Sync + 'static {
    /// Download `uri` and unpack it into `dest`, creating `dest` if needed.
    async fn download_and_extract(&self, uri: &str, dest: &Path) -> Result<(), FetchError>;
}

/// Fetcher that shells out to `aws` and `tar`
#[derive(Clone, Debug)]
pub struct ShellCodeFetcher {
    aws: PathBuf,
    tar: PathBuf,
}

impl Default for ShellCodeFetcher {
    fn default() -> Self {
        Self { aws: PathBuf::from("aws"), tar: PathBuf::from("tar") }
    }
}

impl ShellCodeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aws(mut self, aws: impl Into<PathBuf>) -> Self {
        self.aws = aws.into();
        self
    }

    async fn extract(&self, archive: &Path, dest: &Path) -> Result<(), FetchError> {
        let mut cmd = Command::new(&self.tar);
        cmd.arg("-xzf").arg(archive).arg("-C").arg(dest);
        subprocess::run_captured(cmd).await?;
        Ok(())
    }

    async fn fetch_s3(&self, uri: &str, dest: &Path) -> Result<(), FetchError> {
        let scratch = std::env::temp_dir().join(format!("smc-{}", uuid::Uuid::new_v4().simple()));
        tokio::fs::create_dir_all(&scratch)
            .await
            .map_err(|source| FetchError::Io { path: scratch.clone(), source })?;
        let archive = scratch.join(ARCHIVE_NAME);

        let mut cmd = Command::new(&self.aws);
        cmd.args(["s3", "cp", uri]).arg(&archive);
        let result = match subprocess::run_captured(cmd).await {
            Ok(_) => self.extract(&archive, dest).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = tokio::fs::remove_dir_all(&scratch).await {
            tracing::warn!(path = %scratch.display(), error = %e, "failed to remove download directory");
        }
        result
    }

    async fn fetch_local(&self, path: &Path, dest: &Path) -> Result<(), FetchError> {
        let meta = match tokio::fs::metadata(path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound(path.to_path_buf()))
            }
            Err(source) => return Err(FetchError::Io { path: path.to_path_buf(), source }),
        };
        if !meta.is_dir() {
            return self.extract(path, dest).await;
        }
        if same_dir(path, dest).await {
            tracing::debug!(path = %path.display(), "code already in place");
            return Ok(());
        }
        let copied = fs::copy_into(path, dest).await?;
        tracing::debug!(files = copied, "copied code directory");
        Ok(())
    }
}

async fn same_dir(a: &Path, b: &Path) -> bool {
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[async_trait]
impl CodeFetcher for ShellCodeFetcher {
    async fn download_and_extract(&self, uri: &str, dest: &Path) -> Result<(), FetchError> {
        let source = CodeSource::parse(uri)?;
        tokio::fs::create_dir_all(dest)
            .await
            .map_err(|source| FetchError::Io { path: dest.to_path_buf(), source })?;

        match source {
            CodeSource::S3(uri) => self.fetch_s3(&uri, dest).await?,
            CodeSource::Local(path) => self.fetch_local(&path, dest).await?,
        }
        tracing::info!(%uri, dest = %dest.display(), "code downloaded");
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{CodeFetcher, FetchError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    /// Recorded fetch
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FetchCall {
        pub uri: String,
        pub dest: PathBuf,
    }

    #[derive(Default)]
    struct FakeFetcherState {
        calls: Vec<FetchCall>,
        files: Vec<(PathBuf, String)>,
        fail: bool,
    }

    /// Fake code fetcher for testing.
    ///
    /// Writes the configured files (relative to `dest`) on every fetch.
    #[derive(Clone, Default)]
    pub struct FakeCodeFetcher {
        inner: Arc<Mutex<FakeFetcherState>>,
    }

    impl FakeCodeFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a file that each fetch writes into the destination.
        pub fn with_file(self, path: impl Into<PathBuf>, contents: &str) -> Self {
            self.inner.lock().files.push((path.into(), contents.to_string()));
            self
        }

        /// Make every fetch fail with an unsupported location error.
        pub fn set_fail(&self, fail: bool) {
            self.inner.lock().fail = fail;
        }

        /// Get all recorded calls
        pub fn calls(&self) -> Vec<FetchCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl CodeFetcher for FakeCodeFetcher {
        async fn download_and_extract(&self, uri: &str, dest: &Path) -> Result<(), FetchError> {
            let (files, fail) = {
                let mut inner = self.inner.lock();
                inner.calls.push(FetchCall { uri: uri.to_string(), dest: dest.to_path_buf() });
                (inner.files.clone(), inner.fail)
            };
            if fail {
                return Err(FetchError::UnsupportedScheme(uri.to_string()));
            }
            for (rel, contents) in files {
                let path = dest.join(rel);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .map_err(|source| FetchError::Io { path: parent.to_path_buf(), source })?;
                }
                std::fs::write(&path, contents).map_err(|source| FetchError::Io { path, source })?;
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeCodeFetcher, FetchCall};

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
