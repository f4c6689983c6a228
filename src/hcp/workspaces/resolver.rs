//! Workspace resolution
//!
//! Produces the name → id map of workspaces to export. The map is a
//! `BTreeMap`, so iteration is lexicographic by name whatever order the
//! workspaces were discovered in.

use log::debug;
use std::collections::BTreeMap;

use super::listing::{parse_listing_output, WorkspaceLister};
use super::models::WorkspaceMode;
use crate::error::{BackupError, Result};
use crate::hcp::traits::NamedResource;
use crate::hcp::TfeClient;

/// Resolve workspaces for an organization
///
/// # Arguments
/// * `client` - TFE API client, used for single lookups
/// * `lister` - listing collaborator, used for `WorkspaceMode::All`
/// * `org` - organization name
/// * `mode` - single workspace or all workspaces
pub async fn resolve_workspaces<L>(
    client: &TfeClient,
    lister: &L,
    org: &str,
    mode: &WorkspaceMode,
) -> Result<BTreeMap<String, String>>
where
    L: WorkspaceLister + ?Sized,
{
    match mode {
        WorkspaceMode::Single(name) => resolve_single(client, org, name).await,
        WorkspaceMode::All => {
            debug!("Listing all workspaces in organization '{}'", org);
            let stdout = lister.list(org).await?;
            parse_listing_output(&stdout)
        }
    }
}

/// Resolve one workspace by name
async fn resolve_single(
    client: &TfeClient,
    org: &str,
    name: &str,
) -> Result<BTreeMap<String, String>> {
    let workspace = client
        .get_workspace_by_name(org, name)
        .await?
        .ok_or_else(|| BackupError::WorkspaceNotFound {
            org: org.to_string(),
            name: name.to_string(),
        })?;

    let id = workspace.id().trim_matches('"');
    if id.is_empty() {
        return Err(BackupError::WorkspaceNotFound {
            org: org.to_string(),
            name: name.to_string(),
        });
    }

    debug!("Resolved workspace '{}' to {}", name, id);
    let mut workspaces = BTreeMap::new();
    workspaces.insert(name.to_string(), id.to_string());
    Ok(workspaces)
}
