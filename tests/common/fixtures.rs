//! Test data factories and stub automation scripts
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use template_pr::automation::AutomationInvoker;
use template_pr::config::AppConfig;
use template_pr::types::{Batch, Record};

/// A record carrying every required field
pub fn make_record(app: &str) -> Record {
    Record::from_pairs([
        ("repoUrl", format!("https://github.com/acme/{app}.git")),
        ("branch", "main".to_string()),
        ("appName", app.to_string()),
        ("imageRepo", format!("nexus.example/{app}")),
        ("base_image", "eclipse-temurin:17".to_string()),
        ("jar_file", format!("{app}.jar")),
    ])
}

/// A complete record with one field blanked out
pub fn make_record_without(app: &str, field: &str) -> Record {
    Record::from_pairs(
        make_record(app)
            .fields()
            .iter()
            .map(|(k, v)| (k.clone(), if k == field { String::new() } else { v.clone() })),
    )
}

/// A batch whose headers are the first record's fields
pub fn make_batch(records: Vec<Record>) -> Batch {
    let headers = records
        .first()
        .map(|r| r.fields().keys().cloned().collect())
        .unwrap_or_default();
    Batch::new(headers, records)
}

/// CSV text for records produced by [`make_record`]
pub fn csv_for(apps: &[&str]) -> String {
    let mut csv = String::from("repoUrl,branch,appName,imageRepo,base_image,jar_file\n");
    for app in apps {
        csv.push_str(&format!(
            "https://github.com/acme/{app}.git,main,{app},nexus.example/{app},eclipse-temurin:17,{app}.jar\n"
        ));
    }
    csv
}

/// Write a shell script to `dir` and return its path
pub fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("automation.sh");
    std::fs::write(&path, body).unwrap();
    path
}

/// Invoker running `sh <script>`
pub fn sh_invoker(script: &Path) -> AutomationInvoker {
    AutomationInvoker::new(script).with_interpreter(Some("sh".to_string()))
}

/// Stub that prints a rendered section for every appName in the CSV
///
/// `$2` is the CSV path (`--csv <path>`); appName is the third column.
pub const RENDER_ALL_SCRIPT: &str = r#"
tail -n +2 "$2" | while IFS=, read -r url branch app rest; do
  echo "Processing $app $url"
  echo "RUN: git clone $url"
done
"#;

/// Config pointing at a stub script with a private scratch directory
pub fn test_config(scratch: &Path, script: &Path) -> AppConfig {
    AppConfig {
        interpreter: Some("sh".to_string()),
        script: script.to_path_buf(),
        scratch_dir: scratch.to_path_buf(),
        ..AppConfig::default()
    }
}
