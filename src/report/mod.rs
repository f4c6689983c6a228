//! Failure reporting
//!
//! Every export failure and fatal precondition goes to the operator's
//! error stream and, when alerting is configured, to an external alert
//! sink. Delivery to the sink is best effort and never holds up the
//! caller: its failures are logged and dropped.

use async_trait::async_trait;
use log::{debug, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinSet;

use crate::config::alerting;
use crate::error::Result;
use crate::export::ExportFailure;
use crate::process::run_command;

/// Destination for alert messages
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}

/// Sends alerts by running an external alert command
pub struct CommandAlertSink {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandAlertSink {
    pub fn new(program: impl Into<String>, args: &[&str], timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
            timeout,
        }
    }

    /// The sentry-cli based sink
    pub fn sentry() -> Self {
        Self::new(alerting::PROGRAM, alerting::ARGS, alerting::TIMEOUT)
    }
}

#[async_trait]
impl AlertSink for CommandAlertSink {
    async fn send(&self, message: &str) -> Result<()> {
        let mut args = self.args.clone();
        args.push(message.to_string());
        run_command(&self.program, &args, self.timeout)
            .await?
            .ensure_success()?;
        Ok(())
    }
}

/// Funnels failures to the error stream and the optional alert sink
///
/// Messages hit stderr immediately. Alert deliveries run in the background
/// and are awaited only by [`FailureReporter::flush`], which gives up on
/// stragglers after one overall deadline.
pub struct FailureReporter {
    sink: Option<Arc<dyn AlertSink>>,
    pending: Mutex<JoinSet<()>>,
    flush_timeout: Duration,
}

impl FailureReporter {
    pub fn new(sink: Option<Box<dyn AlertSink>>) -> Self {
        Self {
            sink: sink.map(Arc::from),
            pending: Mutex::new(JoinSet::new()),
            flush_timeout: alerting::FLUSH_TIMEOUT,
        }
    }

    /// A reporter that only writes to stderr
    pub fn stderr_only() -> Self {
        Self::new(None)
    }

    /// Enable the sentry sink when its DSN is present in the environment
    pub fn from_env() -> Self {
        let configured = std::env::var(alerting::DSN_ENV_VAR)
            .map(|dsn| !dsn.trim().is_empty())
            .unwrap_or(false);

        if configured {
            debug!("Alerting enabled via {}", alerting::DSN_ENV_VAR);
            Self::new(Some(Box::new(CommandAlertSink::sentry())))
        } else {
            debug!("{} not set, alerting disabled", alerting::DSN_ENV_VAR);
            Self::stderr_only()
        }
    }

    /// Override how long [`FailureReporter::flush`] waits for deliveries
    pub fn with_flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }

    pub fn alerting_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Report one message to stderr and queue it for the alert sink
    ///
    /// Must be called from within a tokio runtime.
    pub fn report(&self, message: &str) {
        eprintln!("Error: {}", message);
        self.alert(message);
    }

    /// Queue a message for the alert sink only
    pub fn alert(&self, message: &str) {
        let Some(ref sink) = self.sink else {
            return;
        };
        let sink = Arc::clone(sink);
        let message = message.to_string();

        match self.pending.lock() {
            Ok(mut pending) => {
                pending.spawn(async move {
                    if let Err(e) = sink.send(&message).await {
                        warn!("Could not deliver alert: {}", e);
                    }
                });
            }
            Err(_) => warn!("Alert queue unavailable, dropping alert"),
        }
    }

    /// Report an accumulated export failure
    pub fn report_failure(&self, failure: &ExportFailure) {
        self.report(&failure.to_string());
    }

    /// Wait for queued alerts, abandoning whatever is left at the deadline
    pub async fn flush(&self) {
        let mut pending = match self.pending.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return,
        };
        if pending.is_empty() {
            return;
        }

        let queued = pending.len();
        let drain = async {
            while pending.join_next().await.is_some() {}
        };
        if tokio::time::timeout(self.flush_timeout, drain).await.is_err() {
            warn!(
                "Dropped {} of {} alert(s) still undelivered after {:?}",
                pending.len(),
                queued,
                self.flush_timeout
            );
            pending.abort_all();
        } else {
            debug!("Delivered {} queued alert(s)", queued);
        }
    }
}
