//! Input normalization
//!
//! Turns an uploaded spreadsheet or a single form submission into a
//! [`Batch`](crate::types::Batch) and writes the canonical CSV the
//! automation script consumes.

mod form;
mod scratch;
mod spreadsheet;

pub use form::record_from_form;
pub use scratch::{ScratchFile, sanitize_filename, write_batch_csv};
pub use spreadsheet::{FileKind, load_upload, read_csv, read_workbook};
