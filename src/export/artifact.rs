//! Artifact naming and persistence in the staging directory

use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{BackupError, Result};

/// Kind of exported resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResourceKind {
    Workspace,
    VariableSet,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Workspace => write!(f, "workspace"),
            ResourceKind::VariableSet => write!(f, "variable set"),
        }
    }
}

/// Kind of payload fetched for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PayloadKind {
    Attributes,
    Variables,
}

impl PayloadKind {
    pub const ALL: [PayloadKind; 2] = [PayloadKind::Attributes, PayloadKind::Variables];
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadKind::Attributes => write!(f, "attributes"),
            PayloadKind::Variables => write!(f, "variables"),
        }
    }
}

/// One persisted payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub resource_kind: ResourceKind,
    /// Workspace name or sanitized variable set name
    pub resource_key: String,
    pub payload_kind: PayloadKind,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn file_name(&self) -> String {
        artifact_file_name(self.resource_kind, &self.resource_key, self.payload_kind)
    }
}

/// Deterministic file name for a resource payload
///
/// `{name}-attributes.json` for workspaces,
/// `varset-{name}-attributes.json` for variable sets.
pub fn artifact_file_name(kind: ResourceKind, key: &str, payload: PayloadKind) -> String {
    match kind {
        ResourceKind::Workspace => format!("{}-{}.json", key, payload),
        ResourceKind::VariableSet => format!("varset-{}-{}.json", key, payload),
    }
}

/// Wipe and recreate the staging directory
pub async fn prepare_staging_dir(dir: &Path) -> Result<()> {
    if fs::try_exists(dir).await? {
        debug!("Clearing staging directory {}", dir.display());
        fs::remove_dir_all(dir).await.map_err(|e| {
            BackupError::Io(format!("Failed to clear '{}': {}", dir.display(), e))
        })?;
    }
    fs::create_dir_all(dir).await.map_err(|e| {
        BackupError::Io(format!("Failed to create '{}': {}", dir.display(), e))
    })?;
    Ok(())
}

/// Write an artifact into `dir`
///
/// Content lands in a hidden temporary file first and is renamed into
/// place once flushed, so an interrupted write never leaves a file under
/// the artifact's name.
pub async fn write_artifact(dir: &Path, artifact: &ExportArtifact) -> Result<PathBuf> {
    let file_name = artifact.file_name();
    if file_name.contains('/') || file_name.contains('\\') || file_name.starts_with('.') {
        return Err(BackupError::Io(format!(
            "Refusing to write artifact with unsafe name '{}'",
            file_name
        )));
    }

    let final_path = dir.join(&file_name);
    let temp_path = dir.join(format!(".{}.tmp", file_name));

    let result = match write_temp(&temp_path, &artifact.bytes).await {
        Ok(()) => fs::rename(&temp_path, &final_path).await.map_err(|e| {
            BackupError::Io(format!(
                "Failed to move '{}' into place: {}",
                final_path.display(),
                e
            ))
        }),
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        // The temp file may or may not exist depending on where it failed
        let _ = fs::remove_file(&temp_path).await;
        return Err(e);
    }

    debug!(
        "Wrote {} bytes to {}",
        artifact.bytes.len(),
        final_path.display()
    );
    Ok(final_path)
}

async fn write_temp(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = fs::File::create(path).await.map_err(|e| {
        BackupError::Io(format!("Failed to create file '{}': {}", path.display(), e))
    })?;
    file.write_all(bytes).await.map_err(|e| {
        BackupError::Io(format!("Failed to write to '{}': {}", path.display(), e))
    })?;
    file.flush().await.map_err(|e| {
        BackupError::Io(format!("Failed to flush file '{}': {}", path.display(), e))
    })?;
    Ok(())
}
