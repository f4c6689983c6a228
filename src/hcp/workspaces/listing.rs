//! Bulk workspace discovery through an external listing tool
//!
//! The tool is invoked as
//! `<tool> workspaces list --organization <org> --attributes name,id`
//! and prints two header lines followed by one `name, id` line per
//! workspace. Anything else is rejected rather than guessed at.

use async_trait::async_trait;
use log::debug;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{BackupError, Result};
use crate::process::run_command;

/// Number of header lines preceding the workspace rows
pub const HEADER_LINES: usize = 2;

/// Separator between name and id in a row
const ROW_SEPARATOR: &str = ", ";

/// Source of the raw workspace listing for an organization
#[async_trait]
pub trait WorkspaceLister: Send + Sync {
    /// Return the listing tool's stdout
    async fn list(&self, org: &str) -> Result<String>;
}

/// Lists workspaces by running the `tfx` CLI
pub struct TfxWorkspaceLister {
    program: String,
    timeout: Duration,
}

impl TfxWorkspaceLister {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn args(org: &str) -> Vec<String> {
        [
            "workspaces",
            "list",
            "--organization",
            org,
            "--attributes",
            "name,id",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

#[async_trait]
impl WorkspaceLister for TfxWorkspaceLister {
    async fn list(&self, org: &str) -> Result<String> {
        let output = run_command(&self.program, &Self::args(org), self.timeout)
            .await
            .map_err(|e| BackupError::Listing(e.to_string()))?;
        let output = output
            .ensure_success()
            .map_err(|e| BackupError::Listing(e.to_string()))?;
        Ok(output.stdout)
    }
}

/// Parse listing output into a name → id map
///
/// Exactly [`HEADER_LINES`] header lines are skipped. Every following
/// non-blank line must be `name, id` with both parts non-empty, and names
/// must be unique.
pub fn parse_listing_output(stdout: &str) -> Result<BTreeMap<String, String>> {
    let lines: Vec<&str> = stdout.lines().collect();
    if lines.len() < HEADER_LINES {
        return Err(BackupError::Listing(format!(
            "expected {} header lines, got {} lines of output",
            HEADER_LINES,
            lines.len()
        )));
    }

    let mut workspaces = BTreeMap::new();
    for (index, line) in lines.iter().enumerate().skip(HEADER_LINES) {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let mut parts = line.split(ROW_SEPARATOR);
        let (name, id) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(id), None) => (name.trim(), id.trim()),
            _ => {
                return Err(BackupError::Listing(format!(
                    "line {} is not a 'name, id' pair: {:?}",
                    line_number, line
                )))
            }
        };

        if name.is_empty() || id.is_empty() {
            return Err(BackupError::Listing(format!(
                "line {} has an empty name or id: {:?}",
                line_number, line
            )));
        }

        if workspaces.insert(name.to_string(), id.to_string()).is_some() {
            return Err(BackupError::Listing(format!(
                "workspace '{}' listed more than once",
                name
            )));
        }
    }

    debug!("Parsed {} workspaces from listing", workspaces.len());
    Ok(workspaces)
}
