//! Test harness for running scenario catalogs.
//!
//! Scenarios run as tokio tasks sharing one [`BrowserFixture`]; a semaphore
//! caps how many run at once. Each scenario gets its own browsing context
//! per attempt, so no ordering between scenarios is assumed. Results come
//! back in catalog order whatever order the workers finished in.

use crate::fixture::{BrowserFixture, TestScope};
use crate::reporter::TestResultEntry;
use crate::result::VitrineResult;
use crate::selection::Selection;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Boxed future of one scenario attempt
pub type ScenarioFuture = Pin<Box<dyn Future<Output = VitrineResult<()>> + Send>>;

type ScenarioBody = Arc<dyn Fn(TestScope) -> ScenarioFuture + Send + Sync>;

/// A named, marked test body
#[derive(Clone)]
pub struct Scenario {
    name: String,
    markers: Vec<&'static str>,
    body: ScenarioBody,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// Create a scenario from an async function taking the test scope
    pub fn new<F, Fut>(name: impl Into<String>, markers: &[&'static str], body: F) -> Self
    where
        F: Fn(TestScope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = VitrineResult<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            markers: markers.to_vec(),
            body: Arc::new(move |scope| Box::pin(body(scope))),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn markers(&self) -> &[&'static str] {
        &self.markers
    }

    /// Suite part of the name (`login` for `login: standard user`)
    #[must_use]
    pub fn suite(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(suite, _)| suite.trim())
    }

    #[must_use]
    pub fn is_selected(&self, selection: &Selection) -> bool {
        selection.matches(&self.name, &self.markers)
    }

    /// Start one attempt in `scope`
    #[must_use]
    pub fn run(&self, scope: TestScope) -> ScenarioFuture {
        (self.body)(scope)
    }
}

/// Runs scenarios on a bounded pool of workers
#[derive(Debug)]
pub struct TestHarness {
    fixture: Arc<BrowserFixture>,
    workers: usize,
    retries: u32,
    fail_fast: bool,
}

impl TestHarness {
    /// Harness using the fixture's configured parallelism and retries
    #[must_use]
    pub fn new(fixture: Arc<BrowserFixture>) -> Self {
        let workers = fixture.config().parallelism;
        let retries = fixture.config().retries;
        Self {
            fixture,
            workers,
            retries,
            fail_fast: false,
        }
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Stop starting new scenarios after the first failure
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    #[must_use]
    pub const fn fixture(&self) -> &Arc<BrowserFixture> {
        &self.fixture
    }

    /// Run `scenarios`, returning one entry per scenario in input order
    pub async fn run(&self, scenarios: &[Scenario]) -> Vec<TestResultEntry> {
        tracing::info!(
            scenarios = scenarios.len(),
            workers = self.workers,
            retries = self.retries,
            fail_fast = self.fail_fast,
            "run started"
        );
        let semaphore = Arc::new(Semaphore::new(self.workers.max(1)));
        let stop = Arc::new(AtomicBool::new(false));
        let mut tasks = JoinSet::new();

        for (index, scenario) in scenarios.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let stop = Arc::clone(&stop);
            let fixture = Arc::clone(&self.fixture);
            let retries = self.retries;
            let fail_fast = self.fail_fast;
            let _ = tasks.spawn(async move {
                let skipped = || {
                    TestResultEntry::skipped(scenario.name()).with_markers(scenario.markers().iter().copied())
                };
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (index, skipped());
                };
                if stop.load(Ordering::SeqCst) {
                    tracing::info!(test = scenario.name(), "skipped after earlier failure");
                    return (index, skipped());
                }
                let outcome = fixture
                    .run_with_retries(scenario.name(), retries, |scope| scenario.run(scope))
                    .await;
                if fail_fast && !outcome.passed() {
                    stop.store(true, Ordering::SeqCst);
                }
                let entry = TestResultEntry::from_outcome(&outcome)
                    .with_markers(scenario.markers().iter().copied());
                (index, entry)
            });
        }

        let mut results: Vec<Option<TestResultEntry>> = vec![None; scenarios.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, entry)) => results[index] = Some(entry),
                Err(err) => tracing::warn!(error = %err, "worker task failed"),
            }
        }

        results
            .into_iter()
            .zip(scenarios)
            .map(|(entry, scenario)| {
                entry.unwrap_or_else(|| {
                    TestResultEntry::failed(
                        scenario.name(),
                        std::time::Duration::ZERO,
                        &crate::result::VitrineError::fixture("worker task aborted"),
                    )
                    .with_markers(scenario.markers().iter().copied())
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::assertion::Assertion;
    use crate::config::{BrowserKind, DriverBackend, RunConfig, UserRole};
    use crate::reporter::TestStatus;
    use crate::result::VitrineError;
    use crate::simulation::SimulatedBrowser;

    fn fixture(dir: &std::path::Path) -> Arc<BrowserFixture> {
        let config = RunConfig {
            driver: DriverBackend::Simulated,
            default_timeout_ms: 300,
            retries: 0,
            parallelism: 3,
            screenshot_dir: dir.join("shots"),
            ..RunConfig::default()
        };
        let browser = SimulatedBrowser::new(BrowserKind::Chromium, config.base_url.clone());
        Arc::new(BrowserFixture::new(Arc::new(config), Arc::new(browser)))
    }

    async fn badge_after_one_item(scope: TestScope) -> VitrineResult<()> {
        let inventory = scope.logged_in(UserRole::Standard).await?;
        inventory.add_to_cart("Sauce Labs Backpack").await?;
        Assertion::equals(&1, &inventory.header().cart_badge_count().await?).check()
    }

    async fn always_fails(_scope: TestScope) -> VitrineResult<()> {
        Err(VitrineError::AssertionFailed {
            message: "expected failure".to_string(),
        })
    }

    mod scenario_tests {
        use super::*;

        #[test]
        fn test_suite_and_selection() {
            let scenario = Scenario::new("cart: badge", &["cart", "smoke"], badge_after_one_item);
            assert_eq!(scenario.suite(), "cart");
            assert!(scenario.is_selected(&Selection::all().with_markers("smoke").unwrap()));
            assert!(!scenario.is_selected(&Selection::all().with_markers("negative").unwrap()));
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_results_in_catalog_order() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture(dir.path());
            let scenarios: Vec<Scenario> = (0..5)
                .map(|i| {
                    if i == 2 {
                        Scenario::new(format!("case {i}"), &["x"], always_fails)
                    } else {
                        Scenario::new(format!("case {i}"), &["x"], badge_after_one_item)
                    }
                })
                .collect();
            let results = TestHarness::new(Arc::clone(&fixture)).run(&scenarios).await;
            let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
            assert_eq!(names, vec!["case 0", "case 1", "case 2", "case 3", "case 4"]);
            assert_eq!(results[2].status, TestStatus::Failed);
            assert_eq!(results[2].error_kind.as_deref(), Some("AssertionFailed"));
            assert!(results[2].screenshot.is_some());
            assert_eq!(results.iter().filter(|r| r.status.is_passed()).count(), 4);
            assert!(fixture.snapshot().is_balanced());
            assert_eq!(fixture.snapshot().contexts_created, 5);
        }

        #[tokio::test]
        async fn test_fail_fast_skips_rest() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture(dir.path());
            let scenarios = vec![
                Scenario::new("first", &["x"], always_fails),
                Scenario::new("second", &["x"], badge_after_one_item),
                Scenario::new("third", &["x"], badge_after_one_item),
            ];
            let results = TestHarness::new(fixture)
                .with_workers(1)
                .with_fail_fast(true)
                .run(&scenarios)
                .await;
            assert_eq!(results[0].status, TestStatus::Failed);
            assert_eq!(results[1].status, TestStatus::Skipped);
            assert_eq!(results[2].status, TestStatus::Skipped);
        }

        #[tokio::test]
        async fn test_retries_recorded() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture(dir.path());
            let scenarios = vec![Scenario::new("flaky", &["x"], always_fails)];
            let results = TestHarness::new(Arc::clone(&fixture))
                .with_retries(2)
                .run(&scenarios)
                .await;
            assert_eq!(results[0].attempts, 3);
            assert_eq!(fixture.snapshot().contexts_created, 3);
        }
    }
}
