// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conda CLI adapter.
//!
//! All operations shell out to the `conda` executable. The training
//! environment is created when the image is built; this adapter only
//! inspects, updates and runs commands inside it.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::subprocess::{self, SubprocessError};

/// Errors from conda operations
#[derive(Debug, Error)]
pub enum CondaError {
    #[error(transparent)]
    Command(#[from] SubprocessError),
    #[error("unparseable `conda info --json` output: {0}")]
    InvalidInfo(#[source] serde_json::Error),
}

impl CondaError {
    /// Captured stderr, if the failure came from the conda process.
    pub fn stderr(&self) -> &str {
        match self {
            CondaError::Command(e) => e.stderr(),
            CondaError::InvalidInfo(_) => "",
        }
    }
}

/// Adapter for the conda environment manager
#[async_trait]
pub trait CondaAdapter: Clone + Send + Sync + 'static {
    /// `conda --version`
    async fn version(&self) -> Result<String, CondaError>;

    /// `conda run -n <env> conda info`; fails when the environment is missing.
    async fn env_info(&self, env: &str) -> Result<(), CondaError>;

    /// `conda run -n <env> mlflow --version`
    async fn mlflow_version(&self, env: &str) -> Result<String, CondaError>;

    /// `conda env update -n <env> -f <file>`
    async fn update_env(&self, env: &str, file: &Path) -> Result<(), CondaError>;

    /// `conda run -n <env> conda info --json`
    async fn info_json(&self, env: &str) -> Result<serde_json::Value, CondaError>;

    /// `conda run -n <env> <args...>` with exactly the environment `envs`.
    ///
    /// Output goes to this process's stdout with stderr merged in.
    async fn run_in_env(
        &self,
        env: &str,
        args: &[String],
        envs: &HashMap<OsString, OsString>,
    ) -> Result<(), CondaError>;
}

/// Conda adapter backed by the `conda` executable
#[derive(Clone, Debug)]
pub struct CondaCli {
    program: PathBuf,
}

impl CondaCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd
    }

    fn in_env<I, S>(&self, env: &str, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut cmd = self.command(["run", "-n", env]);
        cmd.args(args);
        cmd
    }
}

impl Default for CondaCli {
    fn default() -> Self {
        Self::new("conda")
    }
}

fn stdout_text(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[async_trait]
impl CondaAdapter for CondaCli {
    async fn version(&self) -> Result<String, CondaError> {
        let output = subprocess::run_captured(self.command(["--version"])).await?;
        Ok(stdout_text(&output))
    }

    async fn env_info(&self, env: &str) -> Result<(), CondaError> {
        subprocess::run_captured(self.in_env(env, ["conda", "info"])).await?;
        Ok(())
    }

    async fn mlflow_version(&self, env: &str) -> Result<String, CondaError> {
        let output = subprocess::run_captured(self.in_env(env, ["mlflow", "--version"])).await?;
        Ok(stdout_text(&output))
    }

    async fn update_env(&self, env: &str, file: &Path) -> Result<(), CondaError> {
        let mut cmd = self.command(["env", "update", "-n", env, "-f"]);
        cmd.arg(file);
        subprocess::run_captured(cmd).await?;
        Ok(())
    }

    async fn info_json(&self, env: &str) -> Result<serde_json::Value, CondaError> {
        let output = subprocess::run_captured(self.in_env(env, ["conda", "info", "--json"])).await?;
        serde_json::from_slice(&output.stdout).map_err(CondaError::InvalidInfo)
    }

    async fn run_in_env(
        &self,
        env: &str,
        args: &[String],
        envs: &HashMap<OsString, OsString>,
    ) -> Result<(), CondaError> {
        let mut cmd = self.in_env(env, args);
        cmd.env_clear().envs(envs);
        subprocess::run_streaming(cmd).await?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{CondaAdapter, CondaError};
    use crate::subprocess::SubprocessError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::ffi::OsString;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    /// Recorded conda invocation
    #[derive(Debug, Clone, PartialEq)]
    pub enum CondaCall {
        Version,
        EnvInfo { env: String },
        MlflowVersion { env: String },
        UpdateEnv { env: String, file: PathBuf },
        InfoJson { env: String },
        RunInEnv { env: String, args: Vec<String>, envs: HashMap<OsString, OsString> },
    }

    /// Operation selector for injected failures
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum CondaOp {
        Version,
        EnvInfo,
        MlflowVersion,
        UpdateEnv,
        InfoJson,
        RunInEnv,
    }

    struct FakeCondaState {
        calls: Vec<CondaCall>,
        failures: HashMap<CondaOp, String>,
        info: serde_json::Value,
    }

    /// Fake conda adapter for testing
    #[derive(Clone)]
    pub struct FakeCondaAdapter {
        inner: Arc<Mutex<FakeCondaState>>,
    }

    impl Default for FakeCondaAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeCondaState {
                    calls: Vec::new(),
                    failures: HashMap::new(),
                    info: serde_json::json!({ "active_prefix": "/opt/conda/envs/training" }),
                })),
            }
        }
    }

    impl FakeCondaAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make `op` fail with a non-zero exit and the given stderr.
        pub fn fail(&self, op: CondaOp, stderr: &str) {
            self.inner.lock().failures.insert(op, stderr.to_string());
        }

        /// Set the document returned by `info_json`.
        pub fn set_info(&self, info: serde_json::Value) {
            self.inner.lock().info = info;
        }

        /// Get all recorded calls
        pub fn calls(&self) -> Vec<CondaCall> {
            self.inner.lock().calls.clone()
        }

        fn record(&self, op: CondaOp, call: CondaCall) -> Result<(), CondaError> {
            let mut inner = self.inner.lock();
            inner.calls.push(call);
            match inner.failures.get(&op) {
                Some(stderr) => Err(CondaError::Command(SubprocessError::Failed {
                    command: format!("conda {op:?}"),
                    code: Some(1),
                    stderr: stderr.clone(),
                })),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl CondaAdapter for FakeCondaAdapter {
        async fn version(&self) -> Result<String, CondaError> {
            self.record(CondaOp::Version, CondaCall::Version)?;
            Ok("conda 4.8.3".to_string())
        }

        async fn env_info(&self, env: &str) -> Result<(), CondaError> {
            self.record(CondaOp::EnvInfo, CondaCall::EnvInfo { env: env.to_string() })
        }

        async fn mlflow_version(&self, env: &str) -> Result<String, CondaError> {
            self.record(CondaOp::MlflowVersion, CondaCall::MlflowVersion { env: env.to_string() })?;
            Ok("mlflow, version 1.7.0".to_string())
        }

        async fn update_env(&self, env: &str, file: &Path) -> Result<(), CondaError> {
            self.record(
                CondaOp::UpdateEnv,
                CondaCall::UpdateEnv { env: env.to_string(), file: file.to_path_buf() },
            )
        }

        async fn info_json(&self, env: &str) -> Result<serde_json::Value, CondaError> {
            self.record(CondaOp::InfoJson, CondaCall::InfoJson { env: env.to_string() })?;
            Ok(self.inner.lock().info.clone())
        }

        async fn run_in_env(
            &self,
            env: &str,
            args: &[String],
            envs: &HashMap<OsString, OsString>,
        ) -> Result<(), CondaError> {
            self.record(
                CondaOp::RunInEnv,
                CondaCall::RunInEnv { env: env.to_string(), args: args.to_vec(), envs: envs.clone() },
            )
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{CondaCall, CondaOp, FakeCondaAdapter};

#[cfg(test)]
#[path = "conda_tests.rs"]
mod tests;
