//! Workspace API operations

use crate::config::api;
use crate::error::{BackupError, Result};
use crate::hcp::traits::ApiResponse;
use crate::hcp::TfeClient;

use super::models::Workspace;

/// Path of a workspace looked up by organization and name
fn workspace_by_name_path(org: &str, name: &str) -> String {
    format!(
        "/{}/{}/{}/{}",
        api::ORGANIZATIONS,
        urlencoding::encode(org),
        api::WORKSPACES,
        urlencoding::encode(name)
    )
}

impl TfeClient {
    /// Get a single workspace by name (requires org)
    ///
    /// Returns `None` for 404.
    pub async fn get_workspace_by_name(&self, org: &str, name: &str) -> Result<Option<Workspace>> {
        let url = self.url(&workspace_by_name_path(org, name));

        match self.fetch_json::<ApiResponse<Workspace>>(&url).await {
            Ok(response) => Ok(Some(response.data)),
            Err(BackupError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Raw attributes payload of a workspace
    pub async fn get_workspace_attributes(&self, workspace_id: &str) -> Result<Vec<u8>> {
        let path = format!("/{}/{}", api::WORKSPACES, workspace_id);
        self.fetch_raw_json(&path).await
    }

    /// Raw variables payload of a workspace
    pub async fn get_workspace_variables(&self, workspace_id: &str) -> Result<Vec<u8>> {
        let path = format!("/{}/{}/{}", api::WORKSPACES, workspace_id, api::VARS);
        self.fetch_raw_json(&path).await
    }
}
