//! Automation invoker against real child processes

#![cfg(unix)]

mod common;

use common::fixtures::{sh_invoker, write_script};
use std::path::Path;
use std::time::{Duration, Instant};
use template_pr::types::RunStatus;

fn process_alive(pid: &str) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
        && !std::fs::read_to_string(format!("/proc/{pid}/stat"))
            .is_ok_and(|stat| stat.split_whitespace().nth(2) == Some("Z"))
}

#[tokio::test]
async fn test_timeout_kills_the_whole_process_group() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("sleeper.pid");
    let script = write_script(
        dir.path(),
        &format!(
            "echo started\nsleep 30 &\necho $! > {}\nwait\n",
            pid_file.display()
        ),
    );

    let invoker = sh_invoker(&script).with_timeout(Duration::from_millis(500));
    let started = Instant::now();
    let run = invoker.run(&dir.path().join("batch.csv"), false).await;

    assert_eq!(run.status, RunStatus::TimedOut);
    assert!(run.timed_out());
    assert_eq!(run.error, "execution timed out");
    assert!(started.elapsed() < Duration::from_secs(10));

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    let pid = pid.trim();
    // Give init a moment to reap the orphan.
    for _ in 0..20 {
        if !process_alive(pid) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(!process_alive(pid), "grandchild {pid} survived the timeout");
}

#[tokio::test]
async fn test_background_job_holding_output_does_not_stall_a_clean_exit() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("sleeper.pid");
    let script = write_script(
        dir.path(),
        &format!(
            "echo 'Processing web url'\nsleep 8 &\necho $! > {}\nexit 0\n",
            pid_file.display()
        ),
    );

    let invoker = sh_invoker(&script).with_timeout(Duration::from_secs(1));
    let started = Instant::now();
    let run = invoker.run(&dir.path().join("batch.csv"), false).await;

    assert!(run.success(), "unexpected status {:?}", run.status);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(run.output.contains("Processing web url"));

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    let pid = pid.trim();
    for _ in 0..20 {
        if !process_alive(pid) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(!process_alive(pid), "background job {pid} outlived the run");
}

#[tokio::test]
async fn test_fast_script_finishes_within_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "echo \"Processing web $2\"\n");

    let run = sh_invoker(&script)
        .with_timeout(Duration::from_secs(10))
        .run(Path::new("/tmp/batch.csv"), false)
        .await;

    assert!(run.success());
    assert_eq!(run.output, "Processing web /tmp/batch.csv\n");
}

#[tokio::test]
async fn test_stderr_is_captured_separately() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "echo out\necho oops >&2\nexit 4\n");

    let run = sh_invoker(&script).run(Path::new("x.csv"), false).await;

    assert_eq!(run.status, RunStatus::Exited(Some(4)));
    assert_eq!(run.output, "out\n");
    assert_eq!(run.error, "oops\n");
    assert_eq!(run.failure_detail(), "oops");
    assert_eq!(run.combined_output(), "out\noops\n");
}
