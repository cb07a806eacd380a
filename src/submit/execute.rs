//! Submission execution
//!
//! Validates the batch, runs the automation script once over the valid
//! records, then opens a PR for every record the script rendered without
//! reporting a PR result of its own.

use crate::automation::{AutomationInvoker, SectionStatus, classify_sections};
use crate::error::{Error, Result};
use crate::normalize::write_batch_csv;
use crate::platform::{NewPullRequest, PullRequestService};
use crate::submit::pull_request::{head_branch, pr_body, pr_title};
use crate::submit::{Phase, ProgressCallback};
use crate::types::{Batch, PrOutcome, Record, RecordOutcome, RunResult};
use std::path::Path;
use tracing::debug;

/// Message for rendered records when PR creation is skipped
pub const DRY_RUN_MESSAGE: &str = "dry run: templates rendered, no PR created";

/// Collaborators and settings shared by every submission
pub struct SubmitContext<'a> {
    /// Runs the template-rendering script
    pub invoker: &'a AutomationInvoker,
    /// Opens pull requests
    pub platform: &'a dyn PullRequestService,
    /// Where the request-scoped CSV is written
    pub scratch_dir: &'a Path,
    /// Prefix of the branch the script pushes to
    pub head_branch_prefix: &'a str,
}

/// Result of processing a batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// One outcome per submitted record, in submission order
    pub outcomes: Vec<RecordOutcome>,
    /// The script run; `None` when no record passed validation
    pub run: Option<RunResult>,
}

impl BatchReport {
    /// Number of records
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of successful records
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    /// Everything the script printed, if it ran
    pub fn script_output(&self) -> Option<String> {
        self.run.as_ref().map(RunResult::combined_output)
    }
}

/// Process a batch end to end
///
/// Fails when the batch is empty, when the script cannot be launched or
/// times out, and when it exits non-zero without printing anything.
/// Every other problem is reported on the affected record.
///
/// PRs are only opened after a clean exit. After a failed exit, records the
/// script rendered are reported as "PR status unknown".
pub async fn process_batch(
    batch: &Batch,
    ctx: &SubmitContext<'_>,
    progress: &dyn ProgressCallback,
    dry_run: bool,
) -> Result<BatchReport> {
    if batch.is_empty() {
        return Err(Error::EmptyBatch);
    }

    progress.on_phase(Phase::Validating).await;

    let mut outcomes: Vec<Option<RecordOutcome>> = vec![None; batch.len()];
    let mut valid = Vec::new();
    for (i, record) in batch.records().iter().enumerate() {
        let missing = record.missing_required();
        if missing.is_empty() {
            valid.push(i);
        } else {
            let outcome = RecordOutcome::failed(record, Error::MissingFields(missing).to_string());
            progress.on_record(&outcome).await;
            outcomes[i] = Some(outcome);
        }
    }

    if valid.is_empty() {
        progress
            .on_message("No valid records; automation not started")
            .await;
        progress.on_phase(Phase::Complete).await;
        return Ok(BatchReport {
            outcomes: outcomes.into_iter().flatten().collect(),
            run: None,
        });
    }

    let runnable = batch.select(&valid);

    progress.on_phase(Phase::Running).await;
    let run = {
        let csv = write_batch_csv(&runnable, ctx.scratch_dir)?;
        debug!(path = %csv.path().display(), records = runnable.len(), "wrote batch csv");
        ctx.invoker.run(csv.path(), dry_run).await
    };
    progress.on_run_finished(&run).await;

    if !run.launched() {
        return Err(Error::Automation(run.failure_detail()));
    }
    let output = run.combined_output();
    if !run.success() && output.trim().is_empty() {
        return Err(Error::Automation(run.failure_detail()));
    }

    let statuses = classify_sections(&output, &runnable);

    progress.on_phase(Phase::CreatingPrs).await;
    for ((status, record), index) in statuses.into_iter().zip(runnable.records()).zip(valid) {
        let outcome = match status {
            SectionStatus::Rendered if dry_run => RecordOutcome::succeeded(record, DRY_RUN_MESSAGE),
            SectionStatus::Rendered if run.success() => open_pull_request(record, ctx, progress).await,
            other => other.into_outcome(record),
        };
        progress.on_record(&outcome).await;
        outcomes[index] = Some(outcome);
    }

    progress.on_phase(Phase::Complete).await;

    Ok(BatchReport {
        outcomes: outcomes.into_iter().flatten().collect(),
        run: Some(run),
    })
}

async fn open_pull_request(
    record: &Record,
    ctx: &SubmitContext<'_>,
    progress: &dyn ProgressCallback,
) -> RecordOutcome {
    let app = record.app_name();
    let request = NewPullRequest {
        repo_url: record.repo_url().to_string(),
        base_branch: record.branch().to_string(),
        head_branch: head_branch(ctx.head_branch_prefix, app),
        title: pr_title(app),
        body: pr_body(record),
    };

    match ctx.platform.create_pull_request(&request).await {
        PrOutcome::Created(pr) => {
            progress.on_pr_created(app, &pr).await;
            RecordOutcome::succeeded(record, format!("Successfully created PR for {app}"))
                .with_pr_url(pr.html_url)
        }
        PrOutcome::Failed(error) => RecordOutcome::failed(record, error),
    }
}
