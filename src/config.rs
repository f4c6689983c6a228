/// Configuration constants for TFE API
pub mod api {
    use std::time::Duration;

    /// Base path for TFE API v2
    pub const BASE_PATH: &str = "/api/v2";

    /// Organizations endpoint
    pub const ORGANIZATIONS: &str = "organizations";

    /// Workspaces endpoint
    pub const WORKSPACES: &str = "workspaces";

    /// Variable sets endpoint
    pub const VARSETS: &str = "varsets";

    /// Variables sub-endpoint
    pub const VARS: &str = "vars";

    /// Content type sent with every request
    pub const CONTENT_TYPE: &str = "application/vnd.api+json";

    /// Page size used when listing variable sets
    pub const VARSET_PAGE_SIZE: u32 = 100;

    /// Upper bound on pages walked by the paginator
    pub const MAX_VARSET_PAGES: u32 = 50;

    /// Per-request timeout
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// TCP connect timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Configuration constants for credentials
pub mod credentials {
    /// Credentials file name
    pub const FILE_NAME: &str = "terraform.d/credentials.tfrc.json";

    /// Path to Terraform credentials file on Unix (relative to HOME)
    pub const FILE_PATH_UNIX: &str = ".terraform.d/credentials.tfrc.json";

    /// Environment variable names for token (checked in order)
    pub const TOKEN_ENV_VARS: &[&str] = &["TFE_TOKEN", "TFC_TOKEN", "HCP_TOKEN"];
}

/// Failure alerting collaborator
pub mod alerting {
    /// Environment variable that enables alerting when set
    pub const DSN_ENV_VAR: &str = "SENTRY_DSN";

    /// Program used to send alerts
    pub const PROGRAM: &str = "sentry-cli";

    /// Arguments preceding the alert message
    pub const ARGS: &[&str] = &["send-event", "-m"];

    /// Upper bound on a single alert delivery
    pub const TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

    /// Upper bound on waiting for all queued alerts at the end of a run
    pub const FLUSH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(20);
}

/// Backup engine collaborator
pub mod backup {
    /// Backup engine executable
    pub const PROGRAM: &str = "restic";
}

/// Default values for CLI
pub mod defaults {
    use std::time::Duration;

    /// Default TFE host
    pub const HOST: &str = "app.terraform.io";

    /// Default log level
    pub const LOG_LEVEL: &str = "warn";

    /// Default staging directory
    pub const STAGING_DIR: &str = "/tmp/tfc-backup";

    /// Default workspace listing tool
    pub const LISTING_TOOL: &str = "tfx";

    /// Default number of concurrent export jobs
    pub const CONCURRENCY: usize = 4;

    /// Timeout for the listing tool and the alert sender
    pub const COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(120);

    /// Timeout for backup engine invocations
    pub const BACKUP_TIMEOUT: Duration = Duration::from_secs(3600);
}
