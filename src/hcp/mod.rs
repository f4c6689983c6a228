//! TFE API client module
//!
//! This module provides the HTTP client, pagination and the resource
//! endpoints needed to export workspaces and variable sets.

mod client;
mod credentials;
pub mod pagination;
pub mod traits;
pub mod varsets;
pub mod workspaces;

use serde::Deserialize;

pub use client::TfeClient;
pub use credentials::TokenResolver;
pub use pagination::PaginatedCollection;
pub use traits::{NamedResource, PaginatedResponse};
pub use varsets::{disambiguate_artifact_names, VariableSet};
pub use workspaces::{
    parse_listing_output, resolve_workspaces, TfxWorkspaceLister, Workspace, WorkspaceLister,
    WorkspaceMode,
};

/// Pagination metadata from TFE API (shared across resources)
#[derive(Deserialize, Debug, Default, Clone)]
pub struct PaginationMeta {
    pub pagination: Option<Pagination>,
}

/// Pagination details
#[derive(Deserialize, Debug, Clone)]
pub struct Pagination {
    #[serde(rename = "current-page", default)]
    pub current_page: Option<u32>,
    #[serde(rename = "total-pages", default)]
    pub total_pages: Option<u32>,
    #[serde(rename = "total-count")]
    pub total_count: u32,
}
