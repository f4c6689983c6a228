//! tfc-backup - Export HCP Terraform configuration for backup
//!
//! Discovers the workspaces and variable sets of an organization, writes
//! their attributes and variables as JSON files into a staging directory
//! and optionally hands that directory to restic.
//!
//! # Features
//!
//! - Single workspace lookup or bulk discovery through `tfx`
//! - Paginated variable set listing with count verification
//! - Bounded concurrent export with per-payload failure tolerance
//! - Failure alerts through `sentry-cli` when `SENTRY_DSN` is set
//!
//! # Example
//!
//! ```bash
//! # Export every workspace of an organization
//! tfc-backup --org acme --all
//!
//! # Export one workspace and back it up with restic
//! tfc-backup --org acme --workspace alpha --backup --keep-daily 7
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod hcp;
pub mod process;
pub mod report;
pub mod run;
pub mod ui;

pub use backup::{backup_and_cleanup, BackupEngine, ResticBackup, RetentionPolicy};
pub use cli::Cli;
pub use error::{BackupError, Result};
pub use export::{ExportFailure, ExportOutcome, Exporter};
pub use hcp::{
    resolve_workspaces, PaginatedCollection, TfeClient, TfxWorkspaceLister, TokenResolver,
    VariableSet, WorkspaceLister, WorkspaceMode,
};
pub use report::{AlertSink, CommandAlertSink, FailureReporter};
pub use run::{RunContext, RunOptions, RunPhase, RunSummary};
