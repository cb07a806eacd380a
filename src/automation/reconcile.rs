//! Rebuilds per-record results from the script's free-text output
//!
//! Each record's section starts at its `Processing <appName>` line and runs
//! up to the next marker line. The section is then classified by substring
//! search, in priority order: PR created, PR failed, token missing, and
//! otherwise "templates applied, PR status unknown".

use crate::types::{Batch, Record, RecordOutcome};
use std::collections::HashMap;

/// Prefix of the line opening a record's section
pub const PROCESSING_MARKER: &str = "Processing ";

/// The script opened the PR itself
pub const PR_CREATED_MARKER: &str = "PR created successfully";

/// The script tried to open the PR and failed
pub const PR_FAILED_MARKER: &str = "PR creation failed";

/// The script had no token to open the PR with
pub const TOKEN_MISSING_MARKER: &str = "GIT token not provided";

/// Message for records whose PR was created
pub const PR_CREATED_MESSAGE: &str = "PR created successfully";

/// Message for records rendered without a known PR status
pub const STATUS_UNKNOWN_MESSAGE: &str = "Templates applied; PR status unknown";

/// Message for records the script reported a missing token for
pub const TOKEN_MISSING_MESSAGE: &str = "GIT token not provided";

/// Error for records the script never mentioned
pub const NOT_PROCESSED_MESSAGE: &str = "repository not processed by script";

/// What the script's output says about one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionStatus {
    /// `PR created successfully` seen in the section
    PrCreated,
    /// `PR creation failed` seen; carries that line
    PrFailed(String),
    /// `GIT token not provided` seen
    TokenMissing,
    /// Section present without any PR marker
    Rendered,
    /// No section for this record
    NotProcessed,
}

impl SectionStatus {
    /// User-facing outcome when nobody else acts on the record
    pub fn into_outcome(self, record: &Record) -> RecordOutcome {
        match self {
            Self::PrCreated => RecordOutcome::succeeded(record, PR_CREATED_MESSAGE),
            Self::PrFailed(line) => RecordOutcome::failed(record, line),
            Self::TokenMissing => RecordOutcome::failed(record, TOKEN_MISSING_MESSAGE),
            Self::Rendered => RecordOutcome::succeeded(record, STATUS_UNKNOWN_MESSAGE),
            Self::NotProcessed => RecordOutcome::failed(record, NOT_PROCESSED_MESSAGE),
        }
    }
}

/// One outcome per record, in batch order
pub fn reconcile(output: &str, batch: &Batch) -> Vec<RecordOutcome> {
    classify_sections(output, batch)
        .into_iter()
        .zip(batch.records())
        .map(|(status, record)| status.into_outcome(record))
        .collect()
}

/// One [`SectionStatus`] per record, in batch order
///
/// A marker only matches when the token after `Processing ` equals the
/// appName exactly. The k-th record sharing an appName takes the k-th
/// marker for that name.
pub fn classify_sections(output: &str, batch: &Batch) -> Vec<SectionStatus> {
    let lines: Vec<&str> = output.lines().collect();
    let markers: Vec<(usize, &str)> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| marker_app(line).map(|app| (i, app)))
        .collect();

    let mut occurrences: HashMap<&str, usize> = HashMap::new();

    batch
        .records()
        .iter()
        .map(|record| {
            let app = record.app_name();
            let seen = occurrences.entry(app).or_insert(0);
            let nth = *seen;
            *seen += 1;

            let Some(pos) = markers
                .iter()
                .enumerate()
                .filter(|(_, (_, name))| *name == app)
                .nth(nth)
                .map(|(pos, _)| pos)
            else {
                return SectionStatus::NotProcessed;
            };

            let start = markers[pos].0;
            let end = markers.get(pos + 1).map_or(lines.len(), |(i, _)| *i);
            classify(&lines[start..end])
        })
        .collect()
}

fn marker_app(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once(PROCESSING_MARKER)?;
    rest.split_whitespace().next()
}

fn classify(section: &[&str]) -> SectionStatus {
    if section.iter().any(|l| l.contains(PR_CREATED_MARKER)) {
        return SectionStatus::PrCreated;
    }
    if let Some(line) = section.iter().find(|l| l.contains(PR_FAILED_MARKER)) {
        return SectionStatus::PrFailed(line.trim().to_string());
    }
    if section.iter().any(|l| l.contains(TOKEN_MISSING_MARKER)) {
        return SectionStatus::TokenMissing;
    }
    SectionStatus::Rendered
}
