//! Core types for template-pr

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fields every record must carry (non-blank) before it reaches the script
pub const REQUIRED_FIELDS: [&str; 6] = [
    "repoUrl",
    "branch",
    "appName",
    "imageRepo",
    "base_image",
    "jar_file",
];

/// One target repository configuration (one spreadsheet row / one form)
///
/// Field order is kept as submitted; it becomes the CSV header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, String>,
}

impl Record {
    /// Create a record from an ordered field map
    pub const fn new(fields: IndexMap<String, String>) -> Self {
        Self { fields }
    }

    /// Create a record from `(name, value)` pairs, keeping their order
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw value of a field, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// All fields in submission order
    pub const fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    /// Repository clone URL
    pub fn repo_url(&self) -> &str {
        self.get("repoUrl").unwrap_or_default()
    }

    /// Base branch the templates are applied on top of
    pub fn branch(&self) -> &str {
        self.get("branch").unwrap_or_default()
    }

    /// Application name, the key the script logs each record under
    pub fn app_name(&self) -> &str {
        self.get("appName").unwrap_or_default()
    }

    /// Required fields that are absent or blank, in [`REQUIRED_FIELDS`] order
    pub fn missing_required(&self) -> Vec<String> {
        REQUIRED_FIELDS
            .iter()
            .filter(|name| self.get(name).is_none_or(|v| v.trim().is_empty()))
            .map(ToString::to_string)
            .collect()
    }

    /// Human-readable label: `appName (repoUrl)`
    pub fn label(&self) -> String {
        let app = self.get("appName").unwrap_or("Unknown");
        let url = self.get("repoUrl").unwrap_or("Unknown");
        format!("{app} ({url})")
    }
}

/// Ordered set of records from one submission
///
/// Order is fixed at construction; reconciliation relies on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    headers: Vec<String>,
    records: Vec<Record>,
}

impl Batch {
    /// Create a batch with an explicit header
    pub const fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        Self { headers, records }
    }

    /// Single-record batch whose header is the record's own field order
    pub fn from_record(record: Record) -> Self {
        let headers = record.fields().keys().cloned().collect();
        Self {
            headers,
            records: vec![record],
        }
    }

    /// Column names
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Records in submission order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Same header, subset of records selected by index (order preserved)
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            headers: self.headers.clone(),
            records: indices
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
        }
    }
}

/// How an automation run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Process exited on its own (`None` when killed by a signal)
    Exited(Option<i32>),
    /// Ceiling exceeded; the process was killed
    TimedOut,
    /// Interpreter or script could not be started
    LaunchFailed,
}

/// Captured result of one automation script execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// How the run ended
    pub status: RunStatus,
    /// Captured stdout (lossily decoded)
    pub output: String,
    /// Captured stderr, or the invoker's own diagnostic
    pub error: String,
    /// Wall-clock duration
    pub elapsed: Duration,
}

impl RunResult {
    /// Whether the script ran and exited with status 0
    pub const fn success(&self) -> bool {
        matches!(self.status, RunStatus::Exited(Some(0)))
    }

    /// Whether the run was killed for exceeding the ceiling
    pub const fn timed_out(&self) -> bool {
        matches!(self.status, RunStatus::TimedOut)
    }

    /// Whether the script actually ran (exited on its own)
    pub const fn launched(&self) -> bool {
        matches!(self.status, RunStatus::Exited(_))
    }

    /// Stdout followed by stderr
    pub fn combined_output(&self) -> String {
        if self.error.is_empty() {
            self.output.clone()
        } else if self.output.is_empty() {
            self.error.clone()
        } else {
            format!("{}\n{}", self.output.trim_end_matches('\n'), self.error)
        }
    }

    /// Text describing why the run is not a success
    pub fn failure_detail(&self) -> String {
        let stderr = self.error.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        match self.status {
            RunStatus::Exited(Some(code)) => format!("automation exited with status {code}"),
            RunStatus::Exited(None) => "automation terminated by signal".to_string(),
            RunStatus::TimedOut => "execution timed out".to_string(),
            RunStatus::LaunchFailed => "automation could not be launched".to_string(),
        }
    }
}

/// A pull request as returned by the create call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
}

/// Result of one pull-request creation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrOutcome {
    /// HTTP 201: the PR exists
    Created(PullRequest),
    /// Anything else, with an operator-facing detail
    Failed(String),
}

impl PrOutcome {
    /// Whether the PR was created
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    /// PR URL, present iff created
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Created(pr) => Some(&pr.html_url),
            Self::Failed(_) => None,
        }
    }

    /// PR number, present iff created
    pub const fn number(&self) -> Option<u64> {
        match self {
            Self::Created(pr) => Some(pr.number),
            Self::Failed(_) => None,
        }
    }

    /// Failure detail, present iff failed
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Created(_) => None,
            Self::Failed(e) => Some(e),
        }
    }
}

/// User-facing result for one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordOutcome {
    /// `appName (repoUrl)`
    pub repo: String,
    /// Application name of the record
    pub app_name: String,
    /// Whether the record is considered done
    pub success: bool,
    /// Human message on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error detail on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// PR URL when one was opened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
}

impl RecordOutcome {
    /// Successful outcome
    pub fn succeeded(record: &Record, message: impl Into<String>) -> Self {
        Self {
            repo: record.label(),
            app_name: record.app_name().to_string(),
            success: true,
            message: Some(message.into()),
            error: None,
            pr_url: None,
        }
    }

    /// Failed outcome
    pub fn failed(record: &Record, error: impl Into<String>) -> Self {
        Self {
            repo: record.label(),
            app_name: record.app_name().to_string(),
            success: false,
            message: None,
            error: Some(error.into()),
            pr_url: None,
        }
    }

    /// Attach the opened PR's URL
    #[must_use]
    pub fn with_pr_url(mut self, url: impl Into<String>) -> Self {
        self.pr_url = Some(url.into());
        self
    }

    /// Message or error, whichever is set
    pub fn text(&self) -> &str {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or_default()
    }
}
