//! Test runner implementation

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use vitrine::{BrowserFixture, ReportFormat, Reporter, RunConfig, RunMetadata, Scenario, TestHarness};

/// Runs a selection of scenarios and writes the reports
#[derive(Debug)]
pub struct TestRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl TestRunner {
    /// Create a new test runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self { config, reporter }
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Run `scenarios` against a freshly launched browser.
    ///
    /// The returned reporter holds every result; reports in `formats` are
    /// already written to the run's report directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser cannot be launched or the reports
    /// cannot be written. Failing tests are not errors here.
    pub async fn run(
        &mut self,
        run_config: Arc<RunConfig>,
        scenarios: &[Scenario],
        formats: &[ReportFormat],
    ) -> CliResult<Reporter> {
        let started_at = Utc::now();
        let started = Instant::now();
        self.reporter.header(&format!(
            "Running {} scenarios against {}",
            scenarios.len(),
            run_config.base_url
        ));

        let fixture = Arc::new(BrowserFixture::launch(Arc::clone(&run_config)).await?);
        let harness = TestHarness::new(Arc::clone(&fixture)).with_fail_fast(self.config.fail_fast);

        self.reporter.start_progress(scenarios.len(), "Running");
        let results = harness.run(scenarios).await;
        self.reporter.finish();

        let mut reporter = Reporter::new().with_metadata(RunMetadata {
            base_url: run_config.base_url.clone(),
            browser: run_config.browser.to_string(),
            driver: run_config.driver.to_string(),
            workers: run_config.parallelism,
            started_at,
            finished_at: None,
            lifecycle: None,
        });
        for entry in results {
            self.reporter.result(&entry);
            reporter.record(entry);
        }

        if let Err(err) = fixture.shutdown().await {
            self.reporter.warning(&format!("browser shutdown failed: {err}"));
        }
        reporter.finish(fixture.snapshot());

        let written = reporter.write_reports(&run_config.report_dir, formats)?;
        if self.config.verbosity.is_verbose() {
            for path in &written {
                self.reporter.info(&format!("wrote {}", path.display()));
            }
        }

        self.reporter.summary(
            reporter.passed_count(),
            reporter.failed_count(),
            reporter.skipped_count(),
            started.elapsed(),
        );
        Ok(reporter)
    }
}
