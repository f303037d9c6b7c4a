//! Run reports.
//!
//! A [`Reporter`] collects one [`TestResultEntry`] per scenario and renders
//! them as `report.json` (run metadata plus entries), `junit.xml` for CI,
//! and `report.html` with links to failure screenshots.

use crate::fixture::{LifecycleSnapshot, TestOutcome};
use crate::result::{VitrineError, VitrineResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Test passed
    Passed,
    /// Test failed
    Failed,
    /// Not run (fail-fast stopped the run first)
    Skipped,
}

impl TestStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Individual test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResultEntry {
    /// Scenario name
    pub name: String,
    /// Test status
    pub status: TestStatus,
    /// Duration of the last attempt in milliseconds
    pub duration_ms: u64,
    /// Attempts made
    pub attempts: u32,
    /// Scenario markers
    pub markers: Vec<String>,
    /// Error kind if failed
    pub error_kind: Option<String>,
    /// Error message if failed
    pub error: Option<String>,
    /// Failure screenshot
    pub screenshot: Option<PathBuf>,
    /// When the test finished
    pub finished_at: DateTime<Utc>,
}

impl TestResultEntry {
    /// Create a passing test result
    #[must_use]
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Passed,
            duration_ms: duration.as_millis() as u64,
            attempts: 1,
            markers: Vec::new(),
            error_kind: None,
            error: None,
            screenshot: None,
            finished_at: Utc::now(),
        }
    }

    /// Create a failing test result
    #[must_use]
    pub fn failed(name: impl Into<String>, duration: Duration, error: &VitrineError) -> Self {
        Self {
            status: TestStatus::Failed,
            error_kind: Some(error.kind().to_string()),
            error: Some(error.to_string()),
            ..Self::passed(name, duration)
        }
    }

    /// Create a skipped test result
    #[must_use]
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            status: TestStatus::Skipped,
            attempts: 0,
            ..Self::passed(name, Duration::ZERO)
        }
    }

    /// Entry for a finished test
    #[must_use]
    pub fn from_outcome(outcome: &TestOutcome) -> Self {
        let entry = match &outcome.error {
            None => Self::passed(&outcome.test_id, outcome.duration),
            Some(err) => Self::failed(&outcome.test_id, outcome.duration, err),
        };
        Self {
            attempts: outcome.attempts,
            screenshot: outcome.screenshot.clone(),
            ..entry
        }
    }

    #[must_use]
    pub fn with_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markers = markers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Junit,
    Html,
}

impl ReportFormat {
    pub const ALL: [Self; 3] = [Self::Json, Self::Junit, Self::Html];

    /// File name inside the report directory
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Json => "report.json",
            Self::Junit => "junit.xml",
            Self::Html => "report.html",
        }
    }

    /// Parse a comma-separated list such as `json,junit`
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` naming the unknown format.
    pub fn parse_list(raw: &str) -> VitrineResult<Vec<Self>> {
        let mut formats = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let format = part
                .parse::<Self>()
                .map_err(|reason| VitrineError::config("format", reason))?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        if formats.is_empty() {
            return Err(VitrineError::config("format", "no report format given"));
        }
        Ok(formats)
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Junit => "junit",
            Self::Html => "html",
        })
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "junit" | "xml" => Ok(Self::Junit),
            "html" => Ok(Self::Html),
            other => Err(format!("unknown report format '{other}' (expected json, junit or html)")),
        }
    }
}

/// Facts about the run, written at the top of `report.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub base_url: String,
    pub browser: String,
    pub driver: String,
    pub workers: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub lifecycle: Option<LifecycleSnapshot>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    suite: &'a str,
    summary: JsonSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    run: Option<&'a RunMetadata>,
    tests: &'a [TestResultEntry],
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    pass_rate: f64,
    duration_ms: u64,
}

/// Collects results and writes reports
#[derive(Debug, Default)]
pub struct Reporter {
    results: Vec<TestResultEntry>,
    suite_name: String,
    metadata: Option<RunMetadata>,
}

impl Reporter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            suite_name: "vitrine".to_string(),
            ..Default::default()
        }
    }

    /// Set suite name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = name.into();
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: RunMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Mark the run finished
    pub fn finish(&mut self, lifecycle: LifecycleSnapshot) {
        if let Some(metadata) = &mut self.metadata {
            metadata.finished_at = Some(Utc::now());
            metadata.lifecycle = Some(lifecycle);
        }
    }

    pub fn record(&mut self, result: TestResultEntry) {
        self.results.push(result);
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_passed()).count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_failed()).count()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == TestStatus::Skipped)
            .count()
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// Passed over executed (skipped tests excluded), 1.0 when nothing ran
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        let executed = self.passed_count() + self.failed_count();
        if executed == 0 {
            return 1.0;
        }
        self.passed_count() as f64 / executed as f64
    }

    /// No failed and no skipped test
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0 && self.skipped_count() == 0
    }

    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.results.iter().map(TestResultEntry::duration).sum()
    }

    #[must_use]
    pub fn results(&self) -> &[TestResultEntry] {
        &self.results
    }

    #[must_use]
    pub fn failures(&self) -> Vec<&TestResultEntry> {
        self.results
            .iter()
            .filter(|r| r.status.is_failed())
            .collect()
    }

    /// Generate summary string
    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{}: {}/{} passed ({:.1}%)",
            self.suite_name,
            self.passed_count(),
            self.total_count(),
            self.pass_rate() * 100.0
        );
        if self.skipped_count() > 0 {
            summary.push_str(&format!(", {} skipped", self.skipped_count()));
        }
        summary
    }

    /// Render `report.json`
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_json(&self) -> VitrineResult<String> {
        let report = JsonReport {
            suite: &self.suite_name,
            summary: JsonSummary {
                total: self.total_count(),
                passed: self.passed_count(),
                failed: self.failed_count(),
                skipped: self.skipped_count(),
                pass_rate: self.pass_rate(),
                duration_ms: self.total_duration().as_millis() as u64,
            },
            run: self.metadata.as_ref(),
            tests: &self.results,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

    /// Render HTML report content
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut html = String::new();

        html.push_str(&format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{} report</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }}
        .summary {{ background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }}
        .progress-bar {{ background: #ddd; height: 20px; border-radius: 10px; overflow: hidden; }}
        .passed {{ background: #4caf50; height: 100%; }}
        .test {{ padding: 10px; margin: 5px 0; border-radius: 4px; }}
        .test.pass {{ background: #e8f5e9; border-left: 4px solid #4caf50; }}
        .test.fail {{ background: #ffebee; border-left: 4px solid #f44336; }}
        .test.skip {{ background: #fff3e0; border-left: 4px solid #ff9800; }}
        .markers {{ color: #666; font-size: 0.9em; }}
        .error {{ color: #d32f2f; font-family: monospace; white-space: pre-wrap; }}
    </style>
</head>
<body>
"#,
            escape_xml(&self.suite_name)
        ));

        html.push_str(&format!(
            r#"<div class="summary">
    <h1>{}</h1>
    <h2>Results: {}/{} passed ({:.1}%)</h2>
    <div class="progress-bar">
        <div class="passed" style="width: {:.1}%"></div>
    </div>
    <p>Failed: {} &middot; Skipped: {} &middot; Duration: {:.2}s</p>
</div>
"#,
            escape_xml(&self.suite_name),
            self.passed_count(),
            self.total_count(),
            self.pass_rate() * 100.0,
            self.pass_rate() * 100.0,
            self.failed_count(),
            self.skipped_count(),
            self.total_duration().as_secs_f64()
        ));

        html.push_str("<h2>Test Results</h2>\n");
        for result in &self.results {
            let class = match result.status {
                TestStatus::Passed => "pass",
                TestStatus::Failed => "fail",
                TestStatus::Skipped => "skip",
            };

            html.push_str(&format!(
                r#"<div class="test {}">
    <strong>{}</strong> - {} ({}ms, attempts: {})
    <div class="markers">{}</div>
"#,
                class,
                escape_xml(&result.name),
                result.status.as_str(),
                result.duration_ms,
                result.attempts,
                escape_xml(&result.markers.join(" "))
            ));

            if let Some(error) = &result.error {
                html.push_str(&format!(
                    "    <div class=\"error\">[{}] {}</div>\n",
                    escape_xml(result.error_kind.as_deref().unwrap_or("Error")),
                    escape_xml(error)
                ));
            }
            if let Some(shot) = &result.screenshot {
                let link = escape_xml(&shot.display().to_string());
                html.push_str(&format!(
                    "    <div><a href=\"{link}\">screenshot: {link}</a></div>\n"
                ));
            }

            html.push_str("</div>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    /// Render JUnit XML content
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<testsuite name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}">"#,
            escape_xml(&self.suite_name),
            self.total_count(),
            self.failed_count(),
            self.skipped_count(),
            self.total_duration().as_secs_f64()
        ));
        xml.push('\n');

        for result in &self.results {
            let classname = result.markers.first().map_or("vitrine", String::as_str);
            xml.push_str(&format!(
                r#"  <testcase classname="{}" name="{}" time="{:.3}">"#,
                escape_xml(classname),
                escape_xml(&result.name),
                result.duration().as_secs_f64()
            ));
            xml.push('\n');

            match result.status {
                TestStatus::Failed => {
                    let error = result.error.as_deref().unwrap_or_default();
                    xml.push_str(&format!(
                        r#"    <failure type="{}" message="{}">{}</failure>"#,
                        escape_xml(result.error_kind.as_deref().unwrap_or("Error")),
                        escape_xml(error),
                        escape_xml(error)
                    ));
                    xml.push('\n');
                    if let Some(shot) = &result.screenshot {
                        xml.push_str(&format!(
                            "    <system-out>[[ATTACHMENT|{}]]</system-out>\n",
                            escape_xml(&shot.display().to_string())
                        ));
                    }
                }
                TestStatus::Skipped => xml.push_str("    <skipped/>\n"),
                TestStatus::Passed => {}
            }

            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    /// Write the requested formats into `dir`, returning the written paths
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a file cannot be written.
    pub fn write_reports(&self, dir: &Path, formats: &[ReportFormat]) -> VitrineResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(formats.len());
        for format in formats {
            let path = dir.join(format.file_name());
            let content = match format {
                ReportFormat::Json => self.render_json()?,
                ReportFormat::Junit => self.render_junit(),
                ReportFormat::Html => self.render_html(),
            };
            std::fs::write(&path, content)?;
            tracing::info!(path = %path.display(), %format, "report written");
            written.push(path);
        }
        Ok(written)
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample() -> Reporter {
        let mut reporter = Reporter::new().with_name("storefront");
        reporter.record(
            TestResultEntry::passed("login: standard user", Duration::from_millis(120))
                .with_markers(["smoke", "login"]),
        );
        let mut failed = TestResultEntry::failed(
            "cart: <script> badge",
            Duration::from_millis(80),
            &VitrineError::ProductNotFound {
                name: "Hoverboard".to_string(),
            },
        )
        .with_markers(["cart"]);
        failed.screenshot = Some(PathBuf::from("screenshots/cart_20260101T000000.000Z.png"));
        reporter.record(failed);
        reporter.record(TestResultEntry::skipped("checkout: e2e"));
        reporter
    }

    mod count_tests {
        use super::*;

        #[test]
        fn test_counts_and_rate() {
            let reporter = sample();
            assert_eq!(reporter.total_count(), 3);
            assert_eq!(reporter.passed_count(), 1);
            assert_eq!(reporter.failed_count(), 1);
            assert_eq!(reporter.skipped_count(), 1);
            assert!((reporter.pass_rate() - 0.5).abs() < f64::EPSILON);
            assert!(!reporter.all_passed());
            assert_eq!(reporter.total_duration(), Duration::from_millis(200));
            assert_eq!(reporter.summary(), "storefront: 1/3 passed (50.0%), 1 skipped");
        }

        #[test]
        fn test_empty_run_passes() {
            let reporter = Reporter::new();
            assert!(reporter.all_passed());
            assert!((reporter.pass_rate() - 1.0).abs() < f64::EPSILON);
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_json_report() {
            let json: serde_json::Value =
                serde_json::from_str(&sample().render_json().unwrap()).unwrap();
            assert_eq!(json["summary"]["failed"], 1);
            assert_eq!(json["tests"][1]["error_kind"], "ProductNotFound");
            assert_eq!(json["tests"][2]["status"], "skipped");
            assert!(json.get("run").is_none());
        }

        #[test]
        fn test_html_escapes_and_links() {
            let html = sample().render_html();
            assert!(html.contains("cart: &lt;script&gt; badge"));
            assert!(!html.contains("<script>"));
            assert!(html.contains("href=\"screenshots/cart_20260101T000000.000Z.png\""));
        }

        #[test]
        fn test_junit() {
            let xml = sample().render_junit();
            assert!(xml.contains(r#"tests="3" failures="1" skipped="1""#));
            assert!(xml.contains(r#"<failure type="ProductNotFound""#));
            assert!(xml.contains("<skipped/>"));
            assert!(xml.contains(r#"classname="smoke""#));
        }

        #[test]
        fn test_write_reports() {
            let dir = tempfile::tempdir().unwrap();
            let written = sample()
                .write_reports(&dir.path().join("out"), &ReportFormat::ALL)
                .unwrap();
            assert_eq!(written.len(), 3);
            assert!(written.iter().all(|p| p.exists()));
        }
    }

    mod format_tests {
        use super::*;

        #[test]
        fn test_parse_list() {
            assert_eq!(
                ReportFormat::parse_list("json, html,json").unwrap(),
                vec![ReportFormat::Json, ReportFormat::Html]
            );
            let err = ReportFormat::parse_list("json,pdf").unwrap_err();
            assert!(err.is_configuration());
            assert!(ReportFormat::parse_list(" , ").is_err());
        }
    }
}
