//! CLI progress callback with styled output and a spinner

use crate::cli::style::{Stylize, Verdict, pr_link, run_mark, spinner_style, step};
use anstream::{eprintln, println};
use async_trait::async_trait;
use indicatif::ProgressBar;
use std::sync::Mutex;
use std::time::Duration;
use template_pr::submit::{Phase, ProgressCallback};
use template_pr::types::{PullRequest, RecordOutcome, RunResult};

/// Prints submission progress; spins while the script runs
pub struct CliProgress {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    pub const fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn stop_spinner(&self) {
        let spinner = self.spinner.lock().ok().and_then(|mut slot| slot.take());
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        self.stop_spinner();
        match phase {
            Phase::Running => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(spinner_style());
                spinner.set_message(format!("{phase}..."));
                spinner.enable_steady_tick(Duration::from_millis(80));
                if let Ok(mut slot) = self.spinner.lock() {
                    *slot = Some(spinner);
                }
            }
            Phase::Complete => {}
            _ => println!("{}...", phase.to_string().heading()),
        }
    }

    async fn on_run_finished(&self, run: &RunResult) {
        self.stop_spinner();
        let elapsed = format!("({:.1}s)", run.elapsed.as_secs_f64());
        if run.success() {
            println!("{} Automation finished {}", run_mark(true), elapsed.muted());
        } else {
            eprintln!(
                "{} Automation: {} {}",
                run_mark(false),
                run.failure_detail().failure(),
                elapsed.muted().for_stderr()
            );
        }
    }

    async fn on_pr_created(&self, app_name: &str, pr: &PullRequest) {
        let pr_num = format!("#{}", pr.number);
        println!(
            "  {} Created PR {} for {}",
            step(),
            pr_num.accent(),
            app_name.heading()
        );
    }

    async fn on_record(&self, outcome: &RecordOutcome) {
        let verdict = Verdict::of(outcome);
        if verdict == Verdict::Failed {
            eprintln!(
                "  {} {} {}",
                verdict.mark(),
                outcome.repo.accent().for_stderr(),
                outcome.text().failure()
            );
            return;
        }

        println!(
            "  {} {} {}",
            verdict.mark(),
            outcome.app_name.accent(),
            outcome.text().muted()
        );
        if let Some(url) = &outcome.pr_url {
            println!("    {}", pr_link(verdict.stream(), url));
        }
    }

    async fn on_message(&self, message: &str) {
        println!("{}", message.notice());
    }
}
