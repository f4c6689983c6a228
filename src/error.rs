use std::fmt;

/// Error type for export and backup operations
#[derive(Debug)]
pub enum BackupError {
    /// HTTP request failed before a response arrived
    Http(reqwest::Error),
    /// API returned a non-success status
    Api { status: u16, message: String },
    /// Token not found in any source
    TokenNotFound(String),
    /// Failed to read or parse credentials file
    Credentials(String),
    /// JSON parsing error
    Json(String),
    /// Invalid configuration or arguments
    Config(String),
    /// Filesystem error
    Io(String),
    /// Workspace listing failed or produced unusable output
    Listing(String),
    /// A page of a paginated collection could not be fetched
    Pagination { page: u32, message: String },
    /// More variable sets exist than the paginator may fetch
    VarsetOverflow { total: u32, fetched: u32 },
    /// Single workspace lookup found nothing
    WorkspaceNotFound { org: String, name: String },
    /// External program failed to run or exited non-zero
    Collaborator { program: String, message: String },
    /// Run interrupted by the operator
    Cancelled,
}

/// Exit code after an operator interrupt
pub const EXIT_INTERRUPTED: u8 = 130;

impl BackupError {
    /// Process exit code for an error that ends the run
    pub fn exit_code(&self) -> u8 {
        match self {
            BackupError::Cancelled => EXIT_INTERRUPTED,
            _ => 1,
        }
    }
}

impl fmt::Display for BackupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupError::Http(e) => write!(f, "HTTP request failed: {}", e),
            BackupError::Api { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            BackupError::TokenNotFound(msg) => write!(f, "{}", msg),
            BackupError::Credentials(msg) => write!(f, "{}", msg),
            BackupError::Json(msg) => write!(f, "JSON error: {}", msg),
            BackupError::Config(msg) => write!(f, "Configuration error: {}", msg),
            BackupError::Io(msg) => write!(f, "I/O error: {}", msg),
            BackupError::Listing(msg) => write!(f, "Workspace listing failed: {}", msg),
            BackupError::Pagination { page, message } => {
                write!(f, "Pagination failed at page {}: {}", page, message)
            }
            BackupError::VarsetOverflow { total, fetched } => write!(
                f,
                "Organization has {} variable sets but only {} could be fetched",
                total, fetched
            ),
            BackupError::WorkspaceNotFound { org, name } => {
                write!(f, "Workspace '{}' not found in organization '{}'", name, org)
            }
            BackupError::Collaborator { program, message } => {
                write!(f, "'{}' failed: {}", program, message)
            }
            BackupError::Cancelled => write!(f, "Interrupted"),
        }
    }
}

impl std::error::Error for BackupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackupError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BackupError {
    fn from(err: reqwest::Error) -> Self {
        BackupError::Http(err)
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        BackupError::Json(err.to_string())
    }
}

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        BackupError::Io(err.to_string())
    }
}

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, BackupError>;
