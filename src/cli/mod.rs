//! CLI argument parsing

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::backup::RetentionPolicy;
use crate::config::defaults;
use crate::hcp::WorkspaceMode;

/// Export HCP Terraform workspaces and variable sets for backup
#[derive(Parser, Debug)]
#[command(name = "tfc-backup")]
#[command(version)]
#[command(
    about = "Export HCP Terraform workspaces and variable sets for backup",
    long_about = None
)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .args(["workspace", "all"])
))]
pub struct Cli {
    /// Organization name
    #[arg(long, env = "TFE_ORG")]
    pub org: String,

    /// Export a single workspace by name
    #[arg(long)]
    pub workspace: Option<String>,

    /// Export every workspace in the organization
    #[arg(long)]
    pub all: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// TFE host
    #[arg(short = 'H', long, env = "TFE_HOSTNAME", default_value = defaults::HOST)]
    pub host: String,

    /// API token (overrides env vars and credentials file)
    #[arg(short = 't', long)]
    pub token: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = defaults::LOG_LEVEL)]
    pub log_level: String,

    /// Staging directory for exported files (wiped at start)
    #[arg(long, default_value = defaults::STAGING_DIR)]
    pub dest: PathBuf,

    /// Maximum number of concurrent API requests
    #[arg(long, default_value_t = defaults::CONCURRENCY, value_parser = parse_concurrency)]
    pub concurrency: usize,

    /// Program used to list all workspaces
    #[arg(long, default_value = defaults::LISTING_TOOL)]
    pub listing_tool: String,

    /// Hand the staging directory to restic after exporting
    #[arg(long)]
    pub backup: bool,

    /// Daily snapshots to keep
    #[arg(long, requires = "backup")]
    pub keep_daily: Option<u32>,

    /// Weekly snapshots to keep
    #[arg(long, requires = "backup")]
    pub keep_weekly: Option<u32>,

    /// Monthly snapshots to keep
    #[arg(long, requires = "backup")]
    pub keep_monthly: Option<u32>,
}

/// Parse a worker count of at least one
fn parse_concurrency(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Cli {
    /// Workspace discovery mode selected on the command line
    pub fn workspace_mode(&self) -> WorkspaceMode {
        match &self.workspace {
            Some(name) => WorkspaceMode::Single(name.clone()),
            None => WorkspaceMode::All,
        }
    }

    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy {
            keep_daily: self.keep_daily,
            keep_weekly: self.keep_weekly,
            keep_monthly: self.keep_monthly,
        }
    }
}
