//! Spreadsheet uploads (csv, xlsx, xls)

use crate::error::{Error, Result};
use crate::normalize::scratch::{ScratchFile, sanitize_filename};
use crate::types::{Batch, Record};
use calamine::{Data, Reader, open_workbook_auto};
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Comma-separated values
    Csv,
    /// Office Open XML workbook
    Xlsx,
    /// Legacy Excel workbook
    Xls,
}

impl FileKind {
    /// Classify by extension (case-insensitive)
    pub fn from_filename(name: &str) -> Result<Self> {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .ok_or_else(|| Error::UnsupportedFileType(name.to_string()))?;

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            _ => Err(Error::UnsupportedFileType(name.to_string())),
        }
    }

    /// Extension including the dot
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Xlsx => ".xlsx",
            Self::Xls => ".xls",
        }
    }
}

/// Parse an uploaded file into a batch
///
/// Workbooks are staged in a scratch file (removed before returning) because
/// the reader picks its format from the file extension.
pub fn load_upload(filename: &str, bytes: &[u8], scratch_dir: &Path) -> Result<Batch> {
    let kind = FileKind::from_filename(filename)?;
    debug!(filename, ?kind, size = bytes.len(), "loading upload");

    match kind {
        FileKind::Csv => read_csv(bytes),
        FileKind::Xlsx | FileKind::Xls => {
            let prefix = format!("upload-{}", sanitize_filename(filename));
            let staged = ScratchFile::create(scratch_dir, &prefix, kind.suffix())?;
            let mut handle = staged.as_file();
            handle.write_all(bytes)?;
            handle.flush()?;
            read_workbook(staged.path())
        }
    }
}

/// Read CSV with a header row
pub fn read_csv<R: Read>(input: R) -> Result<Batch> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader.headers()?.iter().map(clean_header).collect();

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row?;
        rows.push(row.iter().map(ToString::to_string).collect::<Vec<_>>());
    }

    build_batch(headers, rows)
}

/// Read the first worksheet of an xlsx/xls workbook
pub fn read_workbook(path: &Path) -> Result<Batch> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Workbook("workbook has no worksheets".to_string()))??;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Batch::default());
    };

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| clean_header(&cell_text(cell)))
        .collect();
    let rows = rows.map(|row| row.iter().map(cell_text).collect()).collect();

    build_batch(headers, rows)
}

/// Pair every row with the header row
///
/// Columns with a blank header are dropped. A repeated header name is an
/// error, since records are keyed by column name.
fn build_batch(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Batch> {
    let mut columns: Vec<(usize, String)> = Vec::with_capacity(headers.len());
    for (i, header) in headers.into_iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        if columns.iter().any(|(_, seen)| *seen == header) {
            return Err(Error::Parse(format!("duplicate column: {header}")));
        }
        columns.push((i, header));
    }

    let records = rows
        .into_iter()
        .filter(|row| row.iter().any(|v| !v.trim().is_empty()))
        .map(|row| {
            Record::from_pairs(
                columns
                    .iter()
                    .map(|(i, h)| (h.clone(), row.get(*i).cloned().unwrap_or_default())),
            )
        })
        .collect();

    let headers = columns.into_iter().map(|(_, h)| h).collect();
    Ok(Batch::new(headers, records))
}

fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

// Integral floats print without a fraction ("8092", not "8092.0").
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_allow_list() {
        assert_eq!(FileKind::from_filename("apps.csv").unwrap(), FileKind::Csv);
        assert_eq!(FileKind::from_filename("Apps.XLSX").unwrap(), FileKind::Xlsx);
        assert_eq!(FileKind::from_filename("old.xls").unwrap(), FileKind::Xls);
        assert!(matches!(
            FileKind::from_filename("notes.txt"),
            Err(Error::UnsupportedFileType(_))
        ));
        assert!(FileKind::from_filename("noextension").is_err());
    }

    #[test]
    fn test_read_csv_keeps_order_and_headers() {
        let input = "\u{feff}repoUrl,branch,appName\n\
                     https://github.com/o/b,main,beta\n\
                     https://github.com/o/a,dev,alpha\n";
        let batch = read_csv(input.as_bytes()).unwrap();
        assert_eq!(batch.headers(), ["repoUrl", "branch", "appName"]);
        let names: Vec<_> = batch.records().iter().map(Record::app_name).collect();
        assert_eq!(names, vec!["beta", "alpha"]);
        assert_eq!(batch.records()[1].branch(), "dev");
    }

    #[test]
    fn test_read_csv_short_rows_and_blank_lines() {
        let input = "appName,branch,namespace\nweb,main\n,,\napi,dev,ns\n";
        let batch = read_csv(input.as_bytes()).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records()[0].get("namespace"), Some(""));
        assert_eq!(batch.records()[1].get("namespace"), Some("ns"));
    }

    #[test]
    fn test_read_csv_quoted_values() {
        let input = "appName,g3_env_map\nweb,\"- { env: RWI, rcwi: rcwi-rwi }\"\n";
        let batch = read_csv(input.as_bytes()).unwrap();
        assert_eq!(
            batch.records()[0].get("g3_env_map"),
            Some("- { env: RWI, rcwi: rcwi-rwi }")
        );
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Float(8092.0)), "8092");
        assert_eq!(cell_text(&Data::Int(3)), "3");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::String("x".into())), "x");
    }

    #[test]
    fn test_load_upload_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_upload("apps.json", b"{}", dir.path()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileType(_)));
    }

    #[test]
    fn test_load_upload_bad_workbook_leaves_no_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_upload("apps.xlsx", b"definitely not a zip", dir.path()).unwrap_err();
        assert!(matches!(err, Error::Workbook(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_read_csv_rejects_duplicate_columns() {
        let input = "appName,branch,appName\nweb,main,api\n";
        let err = read_csv(input.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse(ref m) if m == "duplicate column: appName"));
    }

    #[test]
    fn test_read_csv_drops_unnamed_columns() {
        let input = "appName,,branch,\nweb,x,main,y\n";
        let batch = read_csv(input.as_bytes()).unwrap();
        assert_eq!(batch.headers(), ["appName", "branch"]);
        assert_eq!(batch.records()[0].fields().len(), 2);
        assert_eq!(batch.records()[0].branch(), "main");
    }

    #[test]
    fn test_load_upload_reads_first_worksheet() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = include_bytes!("../../tests/fixtures/apps.xlsx");
        let batch = load_upload("apps.xlsx", bytes, dir.path()).unwrap();

        assert_eq!(
            batch.headers(),
            ["repoUrl", "branch", "appName", "imageRepo", "base_image", "jar_file", "port"]
        );
        // The whitespace-only row is gone and the second sheet is ignored.
        let names: Vec<_> = batch.records().iter().map(Record::app_name).collect();
        assert_eq!(names, vec!["beta", "alpha"]);
        assert_eq!(batch.records()[0].get("port"), Some("8092"));
        assert_eq!(batch.records()[1].get("port"), Some("8080.5"));
        assert_eq!(batch.records()[1].branch(), "dev");
        assert!(batch.records().iter().all(|r| r.missing_required().is_empty()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
