//! Terminal styling for batch output
//!
//! Colors come from `owo-colors`, which honors `NO_COLOR`, `CLICOLOR`,
//! `CLICOLOR_FORCE` and TTY detection per stream. Record lines are marked by
//! their [`Verdict`], so a created PR, an applied-but-unconfirmed record, a
//! dry run and a failure always look different.
//!
//! | Verdict   | Mark | Tone    | Stream |
//! |-----------|------|---------|--------|
//! | `Opened`  | ✓    | green   | stdout |
//! | `Applied` | !    | yellow  | stdout |
//! | `DryRun`  | ○    | dim     | stdout |
//! | `Failed`  | ✗    | red     | stderr |

use indicatif::ProgressStyle;
pub use owo_colors::Stream;
use owo_colors::{OwoColorize, Style};
use std::fmt::{self, Display};
use std::sync::OnceLock;
use template_pr::automation::reconcile::PR_CREATED_MESSAGE;
use template_pr::submit::DRY_RUN_MESSAGE;
use template_pr::types::RecordOutcome;

/// Semantic color of a piece of output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// App names, PR numbers, counts
    Accent,
    /// Records that ended with a pull request
    Success,
    /// Dry-run notices and partial results
    Notice,
    /// Failures
    Failure,
    /// Repository URLs, timings
    Muted,
    /// Phase headers
    Heading,
}

impl Tone {
    const fn style(self) -> Style {
        match self {
            Self::Accent => Style::new().cyan(),
            Self::Success => Style::new().green(),
            Self::Notice => Style::new().yellow(),
            Self::Failure => Style::new().red(),
            Self::Muted => Style::new().dimmed(),
            Self::Heading => Style::new().bold(),
        }
    }
}

/// A value rendered in a [`Tone`] when the target stream supports color
#[derive(Clone, Debug)]
pub struct Styled<T> {
    value: T,
    tone: Tone,
    stream: Stream,
}

impl<T> Styled<T> {
    const fn new(value: T, tone: Tone, stream: Stream) -> Self {
        Self {
            value,
            tone,
            stream,
        }
    }

    /// Detect color support on stderr
    #[must_use]
    pub const fn for_stderr(mut self) -> Self {
        self.stream = Stream::Stderr;
        self
    }
}

impl<T: Display> Display for Styled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = self.tone.style();
        write!(
            f,
            "{}",
            self.value.if_supports_color(self.stream, |v| v.style(style))
        )
    }
}

/// Tone helpers for anything printable
pub trait Stylize: Display {
    /// App names, PR numbers, counts
    fn accent(&self) -> Styled<&Self> {
        Styled::new(self, Tone::Accent, Stream::Stdout)
    }

    /// Dry-run notice, script messages
    fn notice(&self) -> Styled<&Self> {
        Styled::new(self, Tone::Notice, Stream::Stdout)
    }

    /// Error text; checks stderr
    fn failure(&self) -> Styled<&Self> {
        Styled::new(self, Tone::Failure, Stream::Stderr)
    }

    /// Secondary text
    fn muted(&self) -> Styled<&Self> {
        Styled::new(self, Tone::Muted, Stream::Stdout)
    }

    /// Phase headers
    fn heading(&self) -> Styled<&Self> {
        Styled::new(self, Tone::Heading, Stream::Stdout)
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// How a record ended, as the terminal shows it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A pull request exists, opened here or by the script
    Opened,
    /// Templates were applied but no PR was confirmed
    Applied,
    /// Rendered only; GitHub was not called
    DryRun,
    /// The record failed
    Failed,
}

impl Verdict {
    /// Classify a record outcome
    pub fn of(outcome: &RecordOutcome) -> Self {
        let message = outcome.message.as_deref();
        if !outcome.success {
            Self::Failed
        } else if outcome.pr_url.is_some() || message == Some(PR_CREATED_MESSAGE) {
            Self::Opened
        } else if message == Some(DRY_RUN_MESSAGE) {
            Self::DryRun
        } else {
            Self::Applied
        }
    }

    const fn symbol(self) -> &'static str {
        match self {
            Self::Opened => "✓",
            Self::Applied => "!",
            Self::DryRun => "○",
            Self::Failed => "✗",
        }
    }

    const fn tone(self) -> Tone {
        match self {
            Self::Opened => Tone::Success,
            Self::Applied => Tone::Notice,
            Self::DryRun => Tone::Muted,
            Self::Failed => Tone::Failure,
        }
    }

    /// Failures go to stderr
    pub const fn stream(self) -> Stream {
        match self {
            Self::Failed => Stream::Stderr,
            _ => Stream::Stdout,
        }
    }

    /// Colored mark opening the record line
    pub const fn mark(self) -> Styled<&'static str> {
        Styled::new(self.symbol(), self.tone(), self.stream())
    }
}

/// Mark for the automation run as a whole
pub const fn run_mark(succeeded: bool) -> Styled<&'static str> {
    if succeeded {
        Styled::new("✓", Tone::Success, Stream::Stdout)
    } else {
        Styled::new("✗", Tone::Failure, Stream::Stderr)
    }
}

/// Arrow in front of a PR the tool just opened
pub const fn step() -> Styled<&'static str> {
    Styled::new("→", Tone::Accent, Stream::Stdout)
}

/// Closing `n/m succeeded` line; green only when nothing failed
pub fn summary(succeeded: usize, total: usize) -> Styled<String> {
    let tone = if succeeded == total {
        Tone::Success
    } else {
        Tone::Notice
    };
    Styled::new(format!("{succeeded}/{total} succeeded"), tone, Stream::Stdout)
}

/// PR URL as an OSC 8 link where the terminal supports it
pub fn pr_link(stream: Stream, url: &str) -> String {
    let target = match stream {
        Stream::Stdout => supports_hyperlinks::Stream::Stdout,
        Stream::Stderr => supports_hyperlinks::Stream::Stderr,
    };
    if supports_hyperlinks::on(target) {
        terminal_link::Link::new(url, url).to_string()
    } else {
        url.to_string()
    }
}

/// Spinner shown while the automation script runs
pub fn spinner_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use template_pr::automation::reconcile::STATUS_UNKNOWN_MESSAGE;
    use template_pr::types::Record;

    fn record() -> Record {
        Record::from_pairs([
            ("repoUrl", "https://github.com/acme/web.git"),
            ("appName", "web"),
        ])
    }

    #[test]
    fn test_verdict_of_outcomes() {
        let r = record();
        let opened = RecordOutcome::succeeded(&r, "Successfully created PR for web")
            .with_pr_url("https://github.com/acme/web/pull/3");
        assert_eq!(Verdict::of(&opened), Verdict::Opened);
        assert_eq!(
            Verdict::of(&RecordOutcome::succeeded(&r, PR_CREATED_MESSAGE)),
            Verdict::Opened
        );
        assert_eq!(
            Verdict::of(&RecordOutcome::succeeded(&r, STATUS_UNKNOWN_MESSAGE)),
            Verdict::Applied
        );
        assert_eq!(
            Verdict::of(&RecordOutcome::succeeded(&r, DRY_RUN_MESSAGE)),
            Verdict::DryRun
        );
        assert_eq!(
            Verdict::of(&RecordOutcome::failed(&r, "PR creation failed")),
            Verdict::Failed
        );
    }

    #[test]
    fn test_failures_render_on_stderr() {
        assert!(matches!(Verdict::Failed.stream(), Stream::Stderr));
        assert!(matches!(Verdict::DryRun.stream(), Stream::Stdout));
        assert!(matches!(run_mark(false).stream, Stream::Stderr));
        assert_eq!(Verdict::Applied.mark().tone, Tone::Notice);
    }

    #[test]
    fn test_summary_tone() {
        assert_eq!(summary(3, 3).tone, Tone::Success);
        assert_eq!(summary(2, 3).tone, Tone::Notice);
        assert_eq!(summary(2, 3).value, "2/3 succeeded");
    }
}
