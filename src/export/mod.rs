//! Export of workspaces and variable sets into a staging directory

mod artifact;
mod exporter;

pub use artifact::{
    artifact_file_name, prepare_staging_dir, write_artifact, ExportArtifact, PayloadKind,
    ResourceKind,
};
pub use exporter::{
    avoid_workspace_clashes, plan_jobs, ExportFailure, ExportJob, ExportOutcome, Exporter,
};
