//! Hand-off of the staging directory to the backup engine
//!
//! Encryption, deduplication, snapshots and retention all belong to the
//! engine (restic). This module only invokes it and removes the staging
//! directory once a snapshot was taken. Repository location and password
//! come from the engine's own environment.

use async_trait::async_trait;
use log::{debug, info};
use std::path::Path;
use std::time::Duration;

use crate::config::{backup, defaults};
use crate::error::{BackupError, Result};
use crate::process::run_command;

/// Tag attached to every snapshot and used to scope retention
pub const SNAPSHOT_TAG: &str = "tfc-backup";

/// Snapshot retention forwarded to `forget --prune`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub keep_daily: Option<u32>,
    pub keep_weekly: Option<u32>,
    pub keep_monthly: Option<u32>,
}

impl RetentionPolicy {
    pub fn is_empty(&self) -> bool {
        self.keep_daily.is_none() && self.keep_weekly.is_none() && self.keep_monthly.is_none()
    }

    fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for (flag, value) in [
            ("--keep-daily", self.keep_daily),
            ("--keep-weekly", self.keep_weekly),
            ("--keep-monthly", self.keep_monthly),
        ] {
            if let Some(n) = value {
                args.push(flag.to_string());
                args.push(n.to_string());
            }
        }
        args
    }
}

/// External backup engine
#[async_trait]
pub trait BackupEngine: Send + Sync {
    /// Snapshot a directory
    async fn backup(&self, dir: &Path) -> Result<()>;

    /// Apply retention and prune unreferenced data
    async fn prune(&self, policy: &RetentionPolicy) -> Result<()>;
}

/// restic-backed engine
pub struct ResticBackup {
    program: String,
    timeout: Duration,
}

impl ResticBackup {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    async fn run(&self, args: Vec<String>) -> Result<()> {
        let output = run_command(&self.program, &args, self.timeout)
            .await?
            .ensure_success()?;
        debug!("{} output:\n{}", self.program, output.stdout.trim_end());
        Ok(())
    }
}

impl Default for ResticBackup {
    fn default() -> Self {
        Self::new(backup::PROGRAM, defaults::BACKUP_TIMEOUT)
    }
}

#[async_trait]
impl BackupEngine for ResticBackup {
    async fn backup(&self, dir: &Path) -> Result<()> {
        self.run(vec![
            "backup".to_string(),
            dir.display().to_string(),
            "--tag".to_string(),
            SNAPSHOT_TAG.to_string(),
        ])
        .await
    }

    async fn prune(&self, policy: &RetentionPolicy) -> Result<()> {
        let mut args = vec![
            "forget".to_string(),
            "--prune".to_string(),
            "--tag".to_string(),
            SNAPSHOT_TAG.to_string(),
        ];
        args.extend(policy.args());
        self.run(args).await
    }
}

/// Back up the staging directory, apply retention, then remove it
///
/// The directory is kept when the backup fails so the export can be
/// inspected or retried.
pub async fn backup_and_cleanup<E>(engine: &E, dir: &Path, policy: &RetentionPolicy) -> Result<()>
where
    E: BackupEngine + ?Sized,
{
    info!("Backing up {}", dir.display());
    engine.backup(dir).await?;

    if policy.is_empty() {
        debug!("No retention configured, skipping prune");
    } else {
        info!("Applying retention {:?}", policy);
        engine.prune(policy).await?;
    }

    tokio::fs::remove_dir_all(dir).await.map_err(|e| {
        BackupError::Io(format!(
            "Backup succeeded but '{}' could not be removed: {}",
            dir.display(),
            e
        ))
    })?;
    debug!("Removed staging directory {}", dir.display());
    Ok(())
}
