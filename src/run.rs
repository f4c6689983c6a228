//! One export run
//!
//! `Start → ResolvingWorkspaces → Exporting → Done`. Discovery failures
//! (workspace resolution, variable set listing, staging bootstrap) end the
//! run in `AbortedEarly`; failures of individual payloads never do.

use chrono::{DateTime, Utc};
use log::{info, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{BackupError, Result};
use crate::export::{avoid_workspace_clashes, prepare_staging_dir, ExportFailure, Exporter};
use crate::hcp::{
    disambiguate_artifact_names, resolve_workspaces, TfeClient, VariableSet, WorkspaceLister,
    WorkspaceMode,
};
use crate::report::FailureReporter;
use crate::ui::{create_spinner, finish_spinner, finish_spinner_with_status};

/// Workspaces by name and variable sets by artifact key
type Discovered = (BTreeMap<String, String>, Vec<(String, VariableSet)>);

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Start,
    ResolvingWorkspaces,
    Exporting,
    Done,
    AbortedEarly,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Start => write!(f, "start"),
            RunPhase::ResolvingWorkspaces => write!(f, "resolving workspaces"),
            RunPhase::Exporting => write!(f, "exporting"),
            RunPhase::Done => write!(f, "done"),
            RunPhase::AbortedEarly => write!(f, "aborted"),
        }
    }
}

/// What to export and where
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub org: String,
    pub mode: WorkspaceMode,
    pub staging_dir: PathBuf,
    pub concurrency: usize,
    pub quiet: bool,
}

/// Per-run collaborators and state
pub struct RunContext<'a> {
    client: &'a TfeClient,
    lister: &'a dyn WorkspaceLister,
    reporter: &'a FailureReporter,
    cancelled: Arc<AtomicBool>,
    phase: RunPhase,
}

/// Outcome of a run that got past discovery
#[derive(Debug)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub workspaces: usize,
    pub varsets: usize,
    pub artifacts: Vec<PathBuf>,
    pub failures: Vec<ExportFailure>,
    pub warnings: Vec<String>,
}

impl RunSummary {
    /// True when every payload was exported and nothing looked off
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.warnings.is_empty()
    }
}

impl<'a> RunContext<'a> {
    pub fn new(
        client: &'a TfeClient,
        lister: &'a dyn WorkspaceLister,
        reporter: &'a FailureReporter,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            client,
            lister,
            reporter,
            cancelled,
            phase: RunPhase::Start,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    fn enter(&mut self, phase: RunPhase) {
        info!("Run phase: {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    /// Report a fatal discovery error and abort
    async fn abort(&mut self, error: BackupError) -> BackupError {
        self.enter(RunPhase::AbortedEarly);
        self.reporter.report(&error.to_string());
        self.reporter.flush().await;
        error
    }

    /// Run discovery and export
    ///
    /// Fatal errors are reported here before being returned. An interrupted
    /// export returns `BackupError::Cancelled` once in-flight jobs settle.
    pub async fn run_export(&mut self, options: &RunOptions) -> Result<RunSummary> {
        let started_at = Utc::now();
        let mut warnings = Vec::new();

        self.enter(RunPhase::ResolvingWorkspaces);
        let spinner = create_spinner(
            &format!("Discovering workspaces in '{}'...", options.org),
            options.quiet,
        );

        let discovery = self.discover(options, &mut warnings).await;
        finish_spinner(spinner, "Discovery finished");
        let (workspaces, varsets) = match discovery {
            Ok(found) => found,
            Err(e) => return Err(self.abort(e).await),
        };

        for warning in &warnings {
            warn!("{}", warning);
            self.reporter.report(warning);
        }

        self.enter(RunPhase::Exporting);
        let spinner = create_spinner("Exporting payloads...", options.quiet);
        let outcome = Exporter::new(self.client, &options.staging_dir)
            .with_concurrency(options.concurrency)
            .with_cancel_flag(Arc::clone(&self.cancelled))
            .with_progress(spinner.clone())
            .export_all(&workspaces, &varsets)
            .await;
        finish_spinner_with_status(spinner, outcome.failures.len());

        for failure in &outcome.failures {
            self.reporter.report_failure(failure);
        }

        let cancelled = outcome.was_cancelled() || self.cancelled.load(Ordering::SeqCst);
        if cancelled {
            self.reporter.report(&format!(
                "Export interrupted, {} payload(s) not exported",
                outcome.skipped
            ));
        }

        self.enter(RunPhase::Done);
        self.reporter.flush().await;
        if cancelled {
            return Err(BackupError::Cancelled);
        }

        let summary = RunSummary {
            started_at,
            finished_at: Utc::now(),
            workspaces: workspaces.len(),
            varsets: varsets.len(),
            artifacts: outcome.written,
            failures: outcome.failures,
            warnings,
        };
        info!(
            "Exported {} artifacts for {} workspaces and {} variable sets in {}s ({} failures)",
            summary.artifacts.len(),
            summary.workspaces,
            summary.varsets,
            (summary.finished_at - summary.started_at).num_seconds(),
            summary.failures.len()
        );
        Ok(summary)
    }

    async fn discover(&self, options: &RunOptions, warnings: &mut Vec<String>) -> Result<Discovered> {
        let workspaces =
            resolve_workspaces(self.client, self.lister, &options.org, &options.mode).await?;
        info!("Resolved {} workspace(s)", workspaces.len());

        let varsets = self.client.list_varsets(&options.org).await?;
        if let Some(warning) = varsets.consistency_warning("variable sets") {
            warnings.push(warning);
        }

        let (mut keyed, collisions) = disambiguate_artifact_names(&varsets.items);
        for sanitized in collisions {
            warnings.push(format!(
                "Several variable sets map to '{}'; their artifacts carry the variable set id",
                sanitized
            ));
        }
        for key in avoid_workspace_clashes(&workspaces, &mut keyed) {
            warnings.push(format!(
                "Variable set '{}' shares file names with workspace 'varset-{}'; its artifacts carry the variable set id",
                key, key
            ));
        }

        prepare_staging_dir(&options.staging_dir).await?;
        Ok((workspaces, keyed))
    }
}
