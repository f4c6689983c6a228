//! Fetch-and-persist of workspace and variable set payloads
//!
//! Every `(resource, payload)` pair is an independent job writing its own
//! file, so jobs run through a bounded `buffer_unordered` pool. A failed
//! job becomes an `ExportFailure` and never stops the others.

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::artifact::{write_artifact, ExportArtifact, PayloadKind, ResourceKind};
use crate::config::defaults;
use crate::error::Result;
use crate::hcp::{TfeClient, VariableSet};

/// A failed fetch or write for one resource payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFailure {
    /// Workspace name or variable set artifact key
    pub resource_key: String,
    /// What was attempted, e.g. "workspace variables"
    pub operation: String,
    pub cause: String,
}

impl fmt::Display for ExportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to export {} for '{}': {}",
            self.operation, self.resource_key, self.cause
        )
    }
}

/// One unit of export work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    pub resource_kind: ResourceKind,
    pub resource_key: String,
    pub resource_id: String,
    pub payload_kind: PayloadKind,
}

impl ExportJob {
    fn operation(&self) -> String {
        format!("{} {}", self.resource_kind, self.payload_kind)
    }
}

/// Result of an export sweep
#[derive(Debug, Default)]
pub struct ExportOutcome {
    /// Written artifact paths, sorted
    pub written: Vec<PathBuf>,
    /// Failures in no particular order
    pub failures: Vec<ExportFailure>,
    /// Jobs never started because the run was cancelled
    pub skipped: usize,
}

impl ExportOutcome {
    pub fn was_cancelled(&self) -> bool {
        self.skipped > 0
    }
}

enum JobResult {
    Written(PathBuf),
    Failed(ExportFailure),
    Skipped,
}

/// Build the job list: workspaces first, then variable sets, both by key
pub fn plan_jobs(
    workspaces: &BTreeMap<String, String>,
    varsets: &[(String, VariableSet)],
) -> Vec<ExportJob> {
    let workspace_jobs = workspaces.iter().flat_map(|(name, id)| {
        PayloadKind::ALL.into_iter().map(move |payload| ExportJob {
            resource_kind: ResourceKind::Workspace,
            resource_key: name.clone(),
            resource_id: id.clone(),
            payload_kind: payload,
        })
    });

    let varset_jobs = varsets.iter().flat_map(|(key, varset)| {
        PayloadKind::ALL.into_iter().map(move |payload| ExportJob {
            resource_kind: ResourceKind::VariableSet,
            resource_key: key.clone(),
            resource_id: varset.id.clone(),
            payload_kind: payload,
        })
    });

    workspace_jobs.chain(varset_jobs).collect()
}

/// Re-key variable sets whose files would land on a workspace's files
///
/// A workspace named `varset-{key}` writes the same file names as the
/// variable set keyed `{key}`. Such a variable set is re-keyed with its id
/// appended until no workspace or other variable set claims the key.
/// Returns the keys that had to change.
pub fn avoid_workspace_clashes(
    workspaces: &BTreeMap<String, String>,
    varsets: &mut [(String, VariableSet)],
) -> Vec<String> {
    let clashes = |key: &str| workspaces.contains_key(&format!("varset-{}", key));
    let mut taken: BTreeSet<String> = varsets.iter().map(|(key, _)| key.clone()).collect();
    let mut renamed = Vec::new();

    for (key, varset) in varsets.iter_mut() {
        if !clashes(key.as_str()) {
            continue;
        }
        let mut candidate = format!("{}-{}", key, varset.id);
        while clashes(&candidate) || taken.contains(&candidate) {
            candidate = format!("{}-{}", candidate, varset.id);
        }
        debug!("Variable set key '{}' clashes with a workspace, using '{}'", key, candidate);
        taken.insert(candidate.clone());
        renamed.push(std::mem::replace(key, candidate));
    }

    varsets.sort_by(|a, b| a.0.cmp(&b.0));
    renamed
}

/// Exports resource payloads into a staging directory
pub struct Exporter<'a> {
    client: &'a TfeClient,
    dest: PathBuf,
    concurrency: usize,
    cancelled: Arc<AtomicBool>,
    progress: Option<ProgressBar>,
}

impl<'a> Exporter<'a> {
    pub fn new(client: &'a TfeClient, dest: &Path) -> Self {
        Self {
            client,
            dest: dest.to_path_buf(),
            concurrency: defaults::CONCURRENCY,
            cancelled: Arc::new(AtomicBool::new(false)),
            progress: None,
        }
    }

    /// Limit the number of jobs in flight (at least one)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Share a flag that stops new jobs from starting once set
    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Show per-job progress on a spinner
    pub fn with_progress(mut self, progress: Option<ProgressBar>) -> Self {
        self.progress = progress;
        self
    }

    /// Export every workspace and variable set payload
    ///
    /// `varsets` pairs each variable set with its artifact key.
    pub async fn export_all(
        &self,
        workspaces: &BTreeMap<String, String>,
        varsets: &[(String, VariableSet)],
    ) -> ExportOutcome {
        let jobs = plan_jobs(workspaces, varsets);
        let total = jobs.len();
        info!(
            "Exporting {} payloads for {} workspaces and {} variable sets",
            total,
            workspaces.len(),
            varsets.len()
        );

        let results: Vec<JobResult> = stream::iter(jobs)
            .map(|job| self.run_job(job, total))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut outcome = ExportOutcome::default();
        for result in results {
            match result {
                JobResult::Written(path) => outcome.written.push(path),
                JobResult::Failed(failure) => outcome.failures.push(failure),
                JobResult::Skipped => outcome.skipped += 1,
            }
        }
        outcome.written.sort();

        debug!(
            "Export finished: {} written, {} failed, {} skipped",
            outcome.written.len(),
            outcome.failures.len(),
            outcome.skipped
        );
        outcome
    }

    async fn run_job(&self, job: ExportJob, total: usize) -> JobResult {
        if self.cancelled.load(Ordering::SeqCst) {
            return JobResult::Skipped;
        }

        let result = match self.fetch(&job).await {
            Ok(bytes) => {
                let artifact = ExportArtifact {
                    resource_kind: job.resource_kind,
                    resource_key: job.resource_key.clone(),
                    payload_kind: job.payload_kind,
                    bytes,
                };
                write_artifact(&self.dest, &artifact).await
            }
            Err(e) => Err(e),
        };

        if let Some(ref progress) = self.progress {
            progress.inc(1);
            progress.set_message(format!(
                "Exported {}/{} payloads ({})",
                progress.position(),
                total,
                job.resource_key
            ));
        }

        match result {
            Ok(path) => JobResult::Written(path),
            Err(e) => {
                debug!("{} for '{}' failed: {}", job.operation(), job.resource_key, e);
                JobResult::Failed(ExportFailure {
                    resource_key: job.resource_key.clone(),
                    operation: job.operation(),
                    cause: e.to_string(),
                })
            }
        }
    }

    async fn fetch(&self, job: &ExportJob) -> Result<Vec<u8>> {
        let id = job.resource_id.as_str();
        match (job.resource_kind, job.payload_kind) {
            (ResourceKind::Workspace, PayloadKind::Attributes) => {
                self.client.get_workspace_attributes(id).await
            }
            (ResourceKind::Workspace, PayloadKind::Variables) => {
                self.client.get_workspace_variables(id).await
            }
            (ResourceKind::VariableSet, PayloadKind::Attributes) => {
                self.client.get_varset_attributes(id).await
            }
            (ResourceKind::VariableSet, PayloadKind::Variables) => {
                self.client.get_varset_variables(id).await
            }
        }
    }
}
