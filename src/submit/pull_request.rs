//! Naming and content of generated pull requests

use crate::types::Record;
use std::fmt::Write;

/// Prefix of the branch the script pushes rendered templates to
pub const DEFAULT_HEAD_BRANCH_PREFIX: &str = "automation/hdpv2-templates";

/// Branch carrying the rendered templates for an app
pub fn head_branch(prefix: &str, app_name: &str) -> String {
    format!("{}/{app_name}", prefix.trim_end_matches('/'))
}

/// PR title; matches the commit message the script writes
pub fn pr_title(app_name: &str) -> String {
    format!("chore: add HDPV2/IKP templates for {app_name}")
}

/// PR body listing the generated files
pub fn pr_body(record: &Record) -> String {
    let app = record.app_name();
    let mut body = format!("## HDPV2/IKP pipeline templates for `{app}`\n\n");

    let _ = writeln!(body, "Generated files:");
    for file in [
        "ci-config.yaml".to_string(),
        "Dockerfile".to_string(),
        format!("helm-{app}/Chart.yaml"),
        format!("helm-{app}/values.yaml"),
    ] {
        let _ = writeln!(body, "- `{file}`");
    }

    let _ = writeln!(body, "\n| Check | Result |\n|---|---|");
    for check in ["Docker build", "Helm lint", "Tests"] {
        let _ = writeln!(body, "| {check} | pending |");
    }

    if let Some(image) = record.get("imageRepo").filter(|v| !v.is_empty()) {
        let _ = write!(body, "\nImage repository: `{image}`\n");
    }

    body
}
