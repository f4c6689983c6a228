//! Execution of external collaborator programs
//!
//! The workspace lister, the alert sender and the backup engine are all
//! separate executables. They run through `run_command`, which captures
//! stdout and stderr and enforces a timeout.

use log::debug;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::{BackupError, Result};

/// Captured result of a finished program
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub program: String,
    /// Exit code, `None` when terminated by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Turn a non-zero exit into a collaborator error
    pub fn ensure_success(self) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }
        let status = self
            .status
            .map(|c| format!("exit code {}", c))
            .unwrap_or_else(|| "terminated by signal".to_string());
        let stderr = self.stderr.trim();
        let message = if stderr.is_empty() {
            status
        } else {
            format!("{}: {}", status, stderr)
        };
        Err(BackupError::Collaborator {
            program: self.program,
            message,
        })
    }
}

/// Run a program to completion with captured output
///
/// The child is killed if it outlives `timeout`.
pub async fn run_command(program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput> {
    debug!("Running: {} {}", program, args.join(" "));

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| BackupError::Collaborator {
            program: program.to_string(),
            message: format!("failed to start: {}", e),
        })?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| BackupError::Collaborator {
            program: program.to_string(),
            message: format!("timed out after {}s", timeout.as_secs()),
        })?
        .map_err(|e| BackupError::Collaborator {
            program: program.to_string(),
            message: e.to_string(),
        })?;

    let result = CommandOutput {
        program: program.to_string(),
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    debug!("{} finished with status {:?}", program, result.status);
    Ok(result)
}
