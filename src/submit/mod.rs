//! Batch submission pipeline
//!
//! Shared by the HTTP handlers and the `run` command:
//! 1. Validation - reject records missing required fields
//! 2. Running - render templates with the automation script
//! 3. Creating PRs - open a PR for every record the script rendered

mod execute;
mod progress;
mod pull_request;

pub use execute::{BatchReport, DRY_RUN_MESSAGE, SubmitContext, process_batch};
pub use progress::{NoopProgress, Phase, ProgressCallback, TracingProgress};
pub use pull_request::{DEFAULT_HEAD_BRANCH_PREFIX, head_branch, pr_body, pr_title};
