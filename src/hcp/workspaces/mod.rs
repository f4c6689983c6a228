//! Workspace module

mod api;
mod listing;
mod models;
mod resolver;

pub use listing::{parse_listing_output, TfxWorkspaceLister, WorkspaceLister, HEADER_LINES};
pub use models::{Workspace, WorkspaceAttributes, WorkspaceMode};
pub use resolver::resolve_workspaces;
