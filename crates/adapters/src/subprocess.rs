// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking-style subprocess helpers.
//!
//! Every external step of the workflow is a single child process that is
//! awaited to completion. No timeout is applied: a hung tool blocks the
//! workflow until the platform kills the container.

use std::process::{Output, Stdio};

use thiserror::Error;
use tokio::process::Command;

/// Errors from running an external command
#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` {}: {stderr}", exit_description(.code))]
    Failed { command: String, code: Option<i32>, stderr: String },
}

impl SubprocessError {
    /// Captured stderr of a failed command, empty for spawn failures.
    pub fn stderr(&self) -> &str {
        match self {
            SubprocessError::Spawn { .. } => "",
            SubprocessError::Failed { stderr, .. } => stderr,
        }
    }
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("failed with exit code {code}"),
        None => "was terminated by signal".to_string(),
    }
}

/// Render a command line for logs and error messages.
pub fn describe(cmd: &Command) -> String {
    let std_cmd = cmd.as_std();
    std::iter::once(std_cmd.get_program())
        .chain(std_cmd.get_args())
        .map(|s| s.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `cmd` with stdout and stderr captured; non-zero exit is an error.
pub async fn run_captured(mut cmd: Command) -> Result<Output, SubprocessError> {
    let command = describe(&cmd);
    tracing::debug!(%command, "running");

    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| SubprocessError::Spawn { command: command.clone(), source })?;

    if !output.status.success() {
        return Err(SubprocessError::Failed {
            command,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

/// Run `cmd` attached to this process's stdout, with stderr folded into it.
///
/// Output is streamed, not captured, so a failure carries no stderr text.
pub async fn run_streaming(mut cmd: Command) -> Result<(), SubprocessError> {
    let command = describe(&cmd);
    tracing::debug!(%command, "running");

    cmd.stdin(Stdio::null()).stdout(Stdio::inherit()).stderr(stderr_to_stdout());

    let status = cmd
        .status()
        .await
        .map_err(|source| SubprocessError::Spawn { command: command.clone(), source })?;

    if !status.success() {
        return Err(SubprocessError::Failed { command, code: status.code(), stderr: String::new() });
    }
    Ok(())
}

#[cfg(unix)]
fn stderr_to_stdout() -> Stdio {
    use std::os::fd::AsFd;
    match std::io::stdout().as_fd().try_clone_to_owned() {
        Ok(fd) => Stdio::from(fd),
        Err(e) => {
            tracing::warn!(error = %e, "cannot duplicate stdout; child stderr stays separate");
            Stdio::inherit()
        }
    }
}

#[cfg(not(unix))]
fn stderr_to_stdout() -> Stdio {
    Stdio::inherit()
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
