//! Workspace data models

use serde::Deserialize;

use crate::hcp::traits::NamedResource;

/// Workspace data from TFE API
///
/// Only the identity is decoded; exported payloads are kept raw.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub id: String,
    pub attributes: WorkspaceAttributes,
}

/// Workspace attributes from TFE API
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceAttributes {
    pub name: String,
}

impl NamedResource for Workspace {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.attributes.name
    }
}

/// How the set of workspaces to export is discovered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceMode {
    /// Direct lookup of one workspace by name
    Single(String),
    /// Every workspace in the organization, via the listing tool
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_deserialize_ignores_extra_attributes() {
        let ws: Workspace = serde_json::from_value(serde_json::json!({
            "id": "ws-abc",
            "type": "workspaces",
            "attributes": {
                "name": "alpha",
                "execution-mode": "remote",
                "locked": false
            }
        }))
        .unwrap();
        assert_eq!(ws.id(), "ws-abc");
        assert_eq!(ws.name(), "alpha");
    }

    #[test]
    fn test_workspace_requires_id() {
        let result = serde_json::from_value::<Workspace>(serde_json::json!({
            "attributes": {"name": "alpha"}
        }));
        assert!(result.is_err());
    }
}
