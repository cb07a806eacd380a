//! External rendering script: invocation and output reconciliation
//!
//! The script is driven with `--csv <path> [--dry-run]` and reports progress
//! as free text, one `Processing <appName> <repoUrl>` line per record followed
//! by one of the marker phrases in [`reconcile`]. That line protocol has to be
//! versioned together with the script.

mod invoker;
pub mod reconcile;

pub use invoker::{
    AutomationInvoker, DEFAULT_INTERPRETER, DEFAULT_TIMEOUT, MAX_OUTPUT_BYTES, TIMEOUT_ERROR,
};
pub use reconcile::{SectionStatus, classify_sections, reconcile};
