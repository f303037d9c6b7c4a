//! Console output and progress reporting

use console::{style, Style, StyledObject, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use vitrine::{TestResultEntry, TestStatus};

/// Progress reporter for a test run; writes to stderr
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Show a spinner while scenarios run
    pub fn start_progress(&mut self, total: usize, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("{message} ({total} scenarios)"));
        pb.enable_steady_tick(Duration::from_millis(100));
        self.progress_bar = Some(pb);
    }

    /// Remove the spinner
    pub fn finish(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
    }

    /// Print one result line
    pub fn result(&self, entry: &TestResultEntry) {
        match entry.status {
            TestStatus::Passed => self.success(&format!(
                "{} ({}ms{})",
                entry.name,
                entry.duration_ms,
                attempts_note(entry.attempts)
            )),
            TestStatus::Failed => {
                self.failure(&format!(
                    "{}: {}",
                    entry.name,
                    entry.error.as_deref().unwrap_or("unknown error")
                ));
                if let Some(path) = &entry.screenshot {
                    self.info(&format!("  screenshot: {}", path.display()));
                }
            }
            TestStatus::Skipped => self.skipped(&entry.name),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.line(style("✓").green().bold(), "PASS", message);
        }
    }

    /// Print a failure message, even in quiet mode
    pub fn failure(&self, message: &str) {
        self.line(style("✗").red().bold(), "FAIL", message);
    }

    /// Print a skipped test
    pub fn skipped(&self, message: &str) {
        if !self.quiet {
            self.line(style("-").yellow(), "SKIP", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            self.line(style("⚠").yellow().bold(), "WARN", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.line(style("ℹ").blue().bold(), "INFO", message);
        }
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }
        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };
        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    fn line(&self, symbol: StyledObject<&str>, tag: &str, message: &str) {
        let prefix = if self.use_color {
            symbol.to_string()
        } else {
            tag.to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print test summary
    pub fn summary(&self, passed: usize, failed: usize, skipped: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");

        let total = passed + failed + skipped;
        let duration_secs = duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let skipped_style = Style::new().yellow();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} tests in {:.2}s ({} passed, {} failed, {} skipped)",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                skipped_style.apply_to(skipped)
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} tests in {duration_secs:.2}s ({passed} passed, {failed} failed, {skipped} skipped)"
            ));
        }
    }
}

fn attempts_note(attempts: u32) -> String {
    if attempts > 1 {
        format!(", {attempts} attempts")
    } else {
        String::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use vitrine::VitrineError;

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_attempts_note() {
            assert_eq!(attempts_note(1), "");
            assert_eq!(attempts_note(3), ", 3 attempts");
        }

        #[test]
        fn test_result_lines() {
            let reporter = ProgressReporter::new(false, false);
            reporter.result(&TestResultEntry::passed("login: ok", Duration::from_millis(12)));
            reporter.result(&TestResultEntry::failed(
                "cart: badge",
                Duration::from_millis(40),
                &VitrineError::AssertionFailed {
                    message: "expected 1, got 0".to_string(),
                },
            ));
            reporter.result(&TestResultEntry::skipped("checkout: later"));
        }

        #[test]
        fn test_spinner_lifecycle() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_progress(10, "Running");
            reporter.finish();
            assert!(reporter.progress_bar.is_none());
        }

        #[test]
        fn test_quiet_mode_suppresses_output() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_progress(10, "Running");
            assert!(reporter.progress_bar.is_none());
            reporter.success("hidden");
            reporter.warning("hidden");
            reporter.info("hidden");
            reporter.header("hidden");
            // Failure is still printed
            reporter.failure("shown");
            reporter.summary(8, 2, 0, Duration::from_secs(3));
        }
    }
}
