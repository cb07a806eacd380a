//! Progress callback trait for interface-agnostic updates
//!
//! The CLI renders these to the terminal; the HTTP server logs them.

use crate::types::{PullRequest, RecordOutcome, RunResult};
use async_trait::async_trait;
use std::fmt;
use tracing::{info, warn};

/// Submission phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Checking required fields
    Validating,
    /// Automation script is rendering templates
    Running,
    /// Opening PRs for rendered records
    CreatingPrs,
    /// Submission complete
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validating => "Validating records",
            Self::Running => "Running automation",
            Self::CreatingPrs => "Creating pull requests",
            Self::Complete => "Done",
        };
        f.write_str(label)
    }
}

/// Progress callback trait
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called once the automation script has finished
    async fn on_run_finished(&self, run: &RunResult);

    /// Called when a PR is created
    async fn on_pr_created(&self, app_name: &str, pr: &PullRequest);

    /// Called when a record's final outcome is known
    async fn on_record(&self, outcome: &RecordOutcome);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_run_finished(&self, _run: &RunResult) {}
    async fn on_pr_created(&self, _app_name: &str, _pr: &PullRequest) {}
    async fn on_record(&self, _outcome: &RecordOutcome) {}
    async fn on_message(&self, _message: &str) {}
}

/// Forwards progress to `tracing`
pub struct TracingProgress;

#[async_trait]
impl ProgressCallback for TracingProgress {
    async fn on_phase(&self, phase: Phase) {
        info!(%phase, "submission phase");
    }

    async fn on_run_finished(&self, run: &RunResult) {
        info!(
            status = ?run.status,
            elapsed_ms = u64::try_from(run.elapsed.as_millis()).unwrap_or(u64::MAX),
            stdout_bytes = run.output.len(),
            stderr_bytes = run.error.len(),
            "automation finished"
        );
    }

    async fn on_pr_created(&self, app_name: &str, pr: &PullRequest) {
        info!(app_name, number = pr.number, url = %pr.html_url, "pull request created");
    }

    async fn on_record(&self, outcome: &RecordOutcome) {
        if outcome.success {
            info!(repo = %outcome.repo, message = outcome.text(), "record succeeded");
        } else {
            warn!(repo = %outcome.repo, error = outcome.text(), "record failed");
        }
    }

    async fn on_message(&self, message: &str) {
        info!("{message}");
    }
}
