//! Run command - process a CSV or workbook from the command line

use crate::cli::progress::CliProgress;
use crate::cli::style::{Stylize, summary};
use anstream::println;
use std::path::Path;
use template_pr::config::AppConfig;
use template_pr::error::{Error, Result};
use template_pr::normalize::load_upload;
use template_pr::platform::GitHubService;
use template_pr::submit::{SubmitContext, process_batch};

/// Process a batch file; returns whether every record succeeded
pub async fn run_batch(config: &AppConfig, file: &Path, dry_run: bool) -> Result<bool> {
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Parse(format!("not a file: {}", file.display())))?;
    let bytes = tokio::fs::read(file).await?;
    std::fs::create_dir_all(&config.scratch_dir)?;
    let batch = load_upload(&filename, &bytes, &config.scratch_dir)?;

    println!(
        "Processing {} record(s) from {}",
        batch.len().accent(),
        file.display().muted()
    );
    if dry_run {
        println!("{}", "Dry run: no pull requests will be opened".notice());
    }

    let github = GitHubService::new(config.github.clone())?;
    let invoker = config.invoker();
    let ctx = SubmitContext {
        invoker: &invoker,
        platform: &github,
        scratch_dir: &config.scratch_dir,
        head_branch_prefix: &config.head_branch_prefix,
    };

    let report = process_batch(&batch, &ctx, &CliProgress::new(), dry_run).await?;

    println!();
    println!("{}", summary(report.success_count(), report.total()));

    Ok(report.success_count() == report.total())
}
