//! Runs the automation script as a child process with a bounded wait

use crate::types::{RunResult, RunStatus};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Ceiling on a single automation run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Interpreter used when none is configured
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Error text of a timed-out run
pub const TIMEOUT_ERROR: &str = "execution timed out";

/// Bytes retained per output stream; the rest is read and discarded
pub const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Grace period for output readers once the run is over
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Launches the rendering script against a canonical CSV file
#[derive(Debug, Clone)]
pub struct AutomationInvoker {
    interpreter: Option<String>,
    script: PathBuf,
    timeout: Duration,
}

impl AutomationInvoker {
    /// Invoker for `python3 <script>` with the default ceiling
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: Some(DEFAULT_INTERPRETER.to_string()),
            script: script.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Run the script through `interpreter`, or execute it directly with `None`
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: Option<String>) -> Self {
        self.interpreter = interpreter.filter(|i| !i.trim().is_empty());
        self
    }

    /// Override the ceiling
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Script path
    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Configured ceiling
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full argv the invoker would run
    pub fn command_line(&self, csv_path: &Path, dry_run: bool) -> Vec<String> {
        let mut argv = Vec::new();
        if let Some(interpreter) = &self.interpreter {
            argv.push(interpreter.clone());
        }
        argv.push(self.script.display().to_string());
        argv.push("--csv".to_string());
        argv.push(csv_path.display().to_string());
        if dry_run {
            argv.push("--dry-run".to_string());
        }
        argv
    }

    fn program(&self) -> &str {
        self.interpreter
            .as_deref()
            .unwrap_or_else(|| self.script.to_str().unwrap_or_default())
    }

    /// Run the script and wait for it, at most for the configured ceiling
    ///
    /// Never fails: launch problems, timeouts and script failures are all
    /// described by the returned [`RunResult`]. When the script exits or the
    /// ceiling passes, its process group (unix) is killed, so background
    /// jobs holding the output pipes cannot outlive the run. Output readers
    /// then get [`DRAIN_GRACE`] to finish.
    pub async fn run(&self, csv_path: &Path, dry_run: bool) -> RunResult {
        let start = Instant::now();

        if !self.script.exists() {
            return launch_failure(
                format!("automation script not found: {}", self.script.display()),
                start,
            );
        }

        let argv = self.command_line(csv_path, dry_run);
        debug!(command = %argv.join(" "), "launching automation");

        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return launch_failure(
                    format!("automation interpreter not found: {}: {e}", self.program()),
                    start,
                );
            }
            Err(e) => {
                return launch_failure(format!("failed to launch automation: {e}"), start);
            }
        };

        // The pid is gone from `child` once it has been reaped.
        let pid = child.id();
        let stdout = Capture::spawn(child.stdout.take());
        let stderr = Capture::spawn(child.stderr.take());

        let waited = tokio::time::timeout(self.timeout, child.wait()).await;

        // Anything the script left running in its group dies with the run.
        kill_group(pid).await;

        let (status, failure) = match waited {
            Ok(Ok(status)) => (RunStatus::Exited(status.code()), None),
            Ok(Err(e)) => {
                reap(&mut child).await;
                (
                    RunStatus::Exited(None),
                    Some(format!("failed to wait for automation: {e}")),
                )
            }
            Err(_elapsed) => {
                warn!(timeout = ?self.timeout, "automation timed out, killed it");
                reap(&mut child).await;
                (RunStatus::TimedOut, Some(TIMEOUT_ERROR.to_string()))
            }
        };

        let (output, error) = tokio::join!(stdout.finish(), stderr.finish());
        let elapsed = start.elapsed();
        debug!(?status, ?elapsed, "automation finished");

        RunResult {
            status,
            output,
            error: failure.unwrap_or(error),
            elapsed,
        }
    }
}

fn launch_failure(error: String, start: Instant) -> RunResult {
    warn!(%error, "automation unavailable");
    RunResult {
        status: RunStatus::LaunchFailed,
        output: String::new(),
        error,
        elapsed: start.elapsed(),
    }
}

/// Kill the child's process group (the child leads its own group)
#[cfg(unix)]
async fn kill_group(pid: Option<u32>) {
    let Some(pid) = pid else {
        return;
    };
    // A negative pid addresses the whole group.
    let group = format!("-{pid}");
    if let Err(e) = Command::new("kill")
        .args(["-KILL", "--", &group])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
    {
        debug!(error = %e, "process group kill unavailable");
    }
}

#[cfg(not(unix))]
async fn kill_group(_pid: Option<u32>) {}

/// Kill the child if it is still running, then reap it
async fn reap(child: &mut Child) {
    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to kill automation process");
    }
}

/// Output stream collected in the background
///
/// The buffer is shared so a reader cut off after [`DRAIN_GRACE`] still
/// yields what it read so far.
struct Capture {
    buffer: Arc<Mutex<Vec<u8>>>,
    task: JoinHandle<()>,
}

impl Capture {
    fn spawn<R>(handle: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let task = tokio::spawn(read_stream(handle, Arc::clone(&buffer)));
        Self { buffer, task }
    }

    async fn finish(mut self) -> String {
        if tokio::time::timeout(DRAIN_GRACE, &mut self.task).await.is_err() {
            debug!("output still open after the run, dropping the reader");
            self.task.abort();
        }
        let bytes = self
            .buffer
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().clone(), |b| b.clone());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Read a stream to EOF, keeping at most [`MAX_OUTPUT_BYTES`]
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>, buffer: Arc<Mutex<Vec<u8>>>) {
    let Some(mut handle) = handle else {
        return;
    };

    let mut chunk = [0u8; 8192];
    loop {
        match handle.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let Ok(mut kept) = buffer.lock() else {
                    break;
                };
                let room = MAX_OUTPUT_BYTES.saturating_sub(kept.len());
                kept.extend_from_slice(&chunk[..n.min(room)]);
            }
        }
    }
}
