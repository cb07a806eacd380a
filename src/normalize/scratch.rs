//! Request-scoped scratch files
//!
//! Every file lives under the configured scratch directory with a name
//! carrying a fresh UUID and is removed when its [`ScratchFile`] is dropped,
//! on every exit path.

use crate::error::Result;
use crate::types::Batch;
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// A temporary file deleted on drop
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    /// Create an empty scratch file named `<prefix>-<uuid>-XXXX<suffix>`
    pub fn create(dir: &Path, prefix: &str, suffix: &str) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(&format!("{prefix}-{}-", Uuid::new_v4().simple()))
            .suffix(suffix)
            .tempfile_in(dir)?;
        Ok(Self { file })
    }

    /// Location on disk
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Writable handle
    pub fn as_file(&self) -> &std::fs::File {
        self.file.as_file()
    }
}

/// Write the canonical CSV for a batch into a fresh scratch file
///
/// Header first, then one line per record in batch order; fields a record
/// lacks are written empty.
pub fn write_batch_csv(batch: &Batch, dir: &Path) -> Result<ScratchFile> {
    let scratch = ScratchFile::create(dir, "batch", ".csv")?;

    let mut writer = csv::Writer::from_writer(scratch.as_file());
    writer.write_record(batch.headers())?;
    for record in batch.records() {
        writer.write_record(
            batch
                .headers()
                .iter()
                .map(|h| record.get(h).unwrap_or_default()),
        )?;
    }
    writer.flush()?;
    drop(writer);

    Ok(scratch)
}

/// Reduce an uploaded file name to a safe single path component
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;

    #[test]
    fn test_write_batch_csv_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let batch = Batch::new(
            vec!["appName".into(), "repoUrl".into(), "note".into()],
            vec![
                Record::from_pairs([("appName", "a"), ("repoUrl", "https://h/o/a")]),
                Record::from_pairs([
                    ("appName", "b"),
                    ("repoUrl", "https://h/o/b"),
                    ("note", "has, comma"),
                ]),
            ],
        );

        let scratch = write_batch_csv(&batch, dir.path()).unwrap();
        let path = scratch.path().to_path_buf();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "appName,repoUrl,note\na,https://h/o/a,\nb,https://h/o/b,\"has, comma\"\n"
        );
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("batch-"));

        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_scratch_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let a = ScratchFile::create(dir.path(), "batch", ".csv").unwrap();
        let b = ScratchFile::create(dir.path(), "batch", ".csv").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("apps.xlsx"), "apps.xlsx");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\my apps.csv"), "my_apps.csv");
        assert_eq!(sanitize_filename(".."), "upload");
    }
}
