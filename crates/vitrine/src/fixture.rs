//! Fixture and lifecycle management.
//!
//! Three nested scopes:
//!
//! - **run** ([`BrowserFixture`]): one browser process, shared by every test
//!   of the run or worker. Opening and closing browsing contexts is the only
//!   mutation and goes through one exclusive lock.
//! - **test** ([`TestScope`]): one isolated browsing context and its page,
//!   owned by exactly one test attempt and always closed when the attempt
//!   ends, whatever the outcome.
//! - **page**: page objects built on demand by the scope's factories, bound
//!   to the scope's context through a non-owning handle.
//!
//! [`BrowserFixture::run_test`] is the scoped-acquisition block: it opens a
//! scope, runs the body under the per-test timeout, turns panics into
//! `TestPanicked`, stores a failure screenshot if the attempt failed, and
//! closes the context on every path.

use crate::config::{DriverBackend, RunConfig, UserRole};
use crate::driver::{BrowserDriver, ContextOptions, PageDriver, Screenshot};
use crate::interaction::{FailureHook, Interactions, OperationFailure};
use crate::page_object::PageObject;
use crate::pages::{
    CartPage, CheckoutCompletePage, CheckoutInformationPage, CheckoutOverviewPage, InventoryPage,
    LoginPage,
};
use crate::result::{VitrineError, VitrineResult};
use crate::simulation::SimulatedBrowser;
use crate::test_data::{CheckoutRecord, Seed, TestDataGenerator, UserIdentity};
use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Lifecycle counters at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleSnapshot {
    /// Browsing contexts opened
    pub contexts_created: u64,
    /// Browsing contexts closed
    pub contexts_destroyed: u64,
    /// Failure screenshots written
    pub screenshots_saved: u64,
}

impl LifecycleSnapshot {
    /// Every opened context was closed
    #[must_use]
    pub const fn is_balanced(&self) -> bool {
        self.contexts_created == self.contexts_destroyed
    }

    /// Contexts currently open
    #[must_use]
    pub const fn open_contexts(&self) -> u64 {
        self.contexts_created.saturating_sub(self.contexts_destroyed)
    }
}

#[derive(Debug, Default)]
struct LifecycleCounters {
    created: AtomicU64,
    destroyed: AtomicU64,
    screenshots: AtomicU64,
}

// ============================================================================
// Page factories
// ============================================================================

/// A page object of any variant, as returned by [`TestScope::page`]
#[derive(Debug, Clone)]
pub enum AnyPage {
    Login(LoginPage),
    Inventory(InventoryPage),
    Cart(CartPage),
    CheckoutInformation(CheckoutInformationPage),
    CheckoutOverview(CheckoutOverviewPage),
    CheckoutComplete(CheckoutCompletePage),
}

impl AnyPage {
    /// The page behind the common trait
    #[must_use]
    pub fn as_page_object(&self) -> &dyn PageObject {
        match self {
            Self::Login(page) => page,
            Self::Inventory(page) => page,
            Self::Cart(page) => page,
            Self::CheckoutInformation(page) => page,
            Self::CheckoutOverview(page) => page,
            Self::CheckoutComplete(page) => page,
        }
    }

    #[must_use]
    pub fn page_name(&self) -> &'static str {
        self.as_page_object().page_name()
    }

    #[must_use]
    pub fn into_login(self) -> Option<LoginPage> {
        match self {
            Self::Login(page) => Some(page),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_inventory(self) -> Option<InventoryPage> {
        match self {
            Self::Inventory(page) => Some(page),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_cart(self) -> Option<CartPage> {
        match self {
            Self::Cart(page) => Some(page),
            _ => None,
        }
    }
}

/// Construction function for one page variant
pub type PageFactory = fn(Interactions) -> AnyPage;

/// Page factories keyed by capability name
#[derive(Debug, Clone)]
pub struct PageFactories {
    factories: BTreeMap<&'static str, PageFactory>,
}

impl Default for PageFactories {
    fn default() -> Self {
        Self::standard()
    }
}

impl PageFactories {
    /// No factories
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// One factory per storefront page
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .with("login_page", |ui| AnyPage::Login(LoginPage::new(ui)))
            .with("inventory_page", |ui| AnyPage::Inventory(InventoryPage::new(ui)))
            .with("cart_page", |ui| AnyPage::Cart(CartPage::new(ui)))
            .with("checkout_information_page", |ui| {
                AnyPage::CheckoutInformation(CheckoutInformationPage::new(ui))
            })
            .with("checkout_overview_page", |ui| {
                AnyPage::CheckoutOverview(CheckoutOverviewPage::new(ui))
            })
            .with("checkout_complete_page", |ui| {
                AnyPage::CheckoutComplete(CheckoutCompletePage::new(ui))
            })
    }

    /// Register (or replace) a factory
    #[must_use]
    pub fn with(mut self, capability: &'static str, factory: PageFactory) -> Self {
        let _ = self.factories.insert(capability, factory);
        self
    }

    #[must_use]
    pub fn get(&self, capability: &str) -> Option<PageFactory> {
        self.factories.get(capability).copied()
    }

    /// Registered capability names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

// ============================================================================
// Failure recorder
// ============================================================================

/// Failure hook that screenshots the page at each failed operation.
///
/// Only the latest capture is pending. It is used for the test's failure
/// screenshot when the test ends with the error it was captured for.
#[derive(Debug, Default)]
pub struct FailureRecorder {
    capture: bool,
    failures: Mutex<Vec<OperationFailure>>,
    evidence: Mutex<Option<Evidence>>,
}

#[derive(Debug)]
struct Evidence {
    message: String,
    shot: Screenshot,
}

impl FailureRecorder {
    /// Recorder that screenshots the page when `capture` is set
    #[must_use]
    pub fn new(capture: bool) -> Self {
        Self {
            capture,
            ..Self::default()
        }
    }

    /// Failed operations seen so far
    #[must_use]
    pub fn failures(&self) -> Vec<OperationFailure> {
        self.failures
            .lock()
            .map(|failures| failures.clone())
            .unwrap_or_default()
    }

    /// Take the pending screenshot if it was captured for `error`.
    /// Evidence of a failure the test recovered from is dropped.
    pub fn take_evidence_for(&self, error: &VitrineError) -> Option<Screenshot> {
        let evidence = self.evidence.lock().ok().and_then(|mut slot| slot.take())?;
        (evidence.message == error.to_string()).then_some(evidence.shot)
    }

    /// Drop the pending screenshot
    pub fn discard_evidence(&self) {
        if let Ok(mut slot) = self.evidence.lock() {
            *slot = None;
        }
    }
}

#[async_trait]
impl FailureHook for FailureRecorder {
    async fn on_failure(&self, failure: &OperationFailure, page: &dyn PageDriver) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(failure.clone());
        }
        if !self.capture {
            return;
        }
        match page.screenshot().await {
            Ok(shot) => {
                if let Ok(mut slot) = self.evidence.lock() {
                    *slot = Some(Evidence {
                        message: failure.message.clone(),
                        shot,
                    });
                }
            }
            Err(err) => {
                self.discard_evidence();
                warn!(error = %err, "could not capture failure evidence");
            }
        }
    }
}

// ============================================================================
// Test outcome
// ============================================================================

/// Result of one test, after retries
#[derive(Debug)]
pub struct TestOutcome {
    /// Test identifier
    pub test_id: String,
    /// Attempts made (1 when the first attempt decided)
    pub attempts: u32,
    /// Duration of the last attempt
    pub duration: Duration,
    /// Error of the last attempt
    pub error: Option<VitrineError>,
    /// Failure screenshot of the last attempt
    pub screenshot: Option<PathBuf>,
    /// Failed operations recorded during the last attempt
    pub failures: Vec<OperationFailure>,
}

impl TestOutcome {
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.error.is_none()
    }
}

// ============================================================================
// Browser fixture
// ============================================================================

/// Run-scoped fixture: one browser, many isolated contexts
#[derive(Debug)]
pub struct BrowserFixture {
    config: Arc<RunConfig>,
    browser: Arc<dyn BrowserDriver>,
    lifecycle: tokio::sync::Mutex<()>,
    counters: LifecycleCounters,
    factories: PageFactories,
}

impl BrowserFixture {
    /// Wrap an already launched browser
    #[must_use]
    pub fn new(config: Arc<RunConfig>, browser: Arc<dyn BrowserDriver>) -> Self {
        Self {
            config,
            browser,
            lifecycle: tokio::sync::Mutex::new(()),
            counters: LifecycleCounters::default(),
            factories: PageFactories::standard(),
        }
    }

    /// Launch the configured backend
    ///
    /// # Errors
    ///
    /// Returns `BrowserLaunchError` if the browser cannot be started.
    pub async fn launch(config: Arc<RunConfig>) -> VitrineResult<Self> {
        info!(
            browser = %config.browser,
            driver = %config.driver,
            headless = config.headless,
            "launching browser"
        );
        let browser: Arc<dyn BrowserDriver> = match config.driver {
            DriverBackend::Simulated => {
                Arc::new(SimulatedBrowser::new(config.browser, config.base_url.clone()))
            }
            DriverBackend::Cdp => crate::browser::launch(&config).await?,
        };
        Ok(Self::new(config, browser))
    }

    /// Replace the page factory map
    #[must_use]
    pub fn with_factories(mut self, factories: PageFactories) -> Self {
        self.factories = factories;
        self
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    #[must_use]
    pub const fn factories(&self) -> &PageFactories {
        &self.factories
    }

    /// Current lifecycle counters
    #[must_use]
    pub fn snapshot(&self) -> LifecycleSnapshot {
        LifecycleSnapshot {
            contexts_created: self.counters.created.load(Ordering::SeqCst),
            contexts_destroyed: self.counters.destroyed.load(Ordering::SeqCst),
            screenshots_saved: self.counters.screenshots.load(Ordering::SeqCst),
        }
    }

    fn context_options(&self) -> ContextOptions {
        ContextOptions {
            viewport: self.config.viewport,
            slow_mo: Duration::from_millis(self.config.slow_mo_ms),
            navigation_timeout: self.config.navigation_timeout(),
        }
    }

    async fn open_context(&self) -> VitrineResult<Arc<dyn PageDriver>> {
        let _guard = self.lifecycle.lock().await;
        let page: Arc<dyn PageDriver> =
            Arc::from(self.browser.new_context(&self.context_options()).await?);
        let _ = self.counters.created.fetch_add(1, Ordering::SeqCst);
        debug!(context = page.context_id(), "context opened");
        Ok(page)
    }

    async fn close_context(&self, page: Arc<dyn PageDriver>) {
        let _guard = self.lifecycle.lock().await;
        if let Err(err) = page.close().await {
            warn!(context = page.context_id(), error = %err, "context close failed");
        }
        let _ = self.counters.destroyed.fetch_add(1, Ordering::SeqCst);
        debug!(context = page.context_id(), "context closed");
    }

    /// Open a fresh test scope. The caller must call
    /// [`TestScope::teardown`]; [`run_test`](Self::run_test) does.
    ///
    /// # Errors
    ///
    /// Returns an error if the browsing context cannot be created.
    pub async fn open_scope(self: &Arc<Self>, test_id: &str, attempt: u32) -> VitrineResult<TestScope> {
        let page = self.open_context().await?;
        let recorder = Arc::new(FailureRecorder::new(self.config.screenshot_on_failure));
        let ui = Interactions::new(&page, &self.config.base_url)
            .with_timeout(self.config.default_timeout_ms)
            .with_navigation_timeout(self.config.navigation_timeout_ms)
            .with_failure_hook(Arc::clone(&recorder) as Arc<dyn FailureHook>);
        let data = self
            .config
            .data_seed
            .map_or_else(TestDataGenerator::random, |seed| {
                TestDataGenerator::new(Seed::from_u64(seed).for_attempt(test_id, attempt))
            });
        Ok(TestScope {
            inner: Arc::new(ScopeInner {
                test_id: test_id.to_string(),
                attempt,
                fixture: Arc::clone(self),
                page: Mutex::new(Some(page)),
                ui,
                recorder,
                data: Mutex::new(data),
            }),
        })
    }

    /// Run one attempt of a test in its own scope
    pub async fn run_test<F, Fut>(self: &Arc<Self>, test_id: &str, attempt: u32, body: F) -> TestOutcome
    where
        F: FnOnce(TestScope) -> Fut,
        Fut: Future<Output = VitrineResult<()>>,
    {
        let started = Instant::now();
        info!(test = test_id, attempt, "test started");
        let scope = match self.open_scope(test_id, attempt).await {
            Ok(scope) => scope,
            Err(err) => {
                warn!(test = test_id, error = %err, "test setup failed");
                return TestOutcome {
                    test_id: test_id.to_string(),
                    attempts: attempt,
                    duration: started.elapsed(),
                    error: Some(err),
                    screenshot: None,
                    failures: Vec::new(),
                };
            }
        };

        let limit = self.config.test_timeout();
        let guarded = AssertUnwindSafe(body(scope.clone())).catch_unwind();
        let result = match tokio::time::timeout(limit, guarded).await {
            Ok(Ok(result)) => result,
            Ok(Err(payload)) => Err(VitrineError::TestPanicked {
                message: panic_message(payload.as_ref()),
            }),
            Err(_) => Err(VitrineError::Timeout {
                ms: self.config.test_timeout_ms,
                waiting_for: format!("test {test_id} to finish"),
            }),
        };

        let screenshot = match &result {
            Err(err) => scope.save_failure_screenshot(err).await,
            Ok(()) => {
                scope.inner.recorder.discard_evidence();
                None
            }
        };
        let failures = scope.inner.recorder.failures();
        scope.teardown().await;

        let duration = started.elapsed();
        match &result {
            Ok(()) => info!(test = test_id, attempt, ?duration, "test passed"),
            Err(err) => warn!(
                test = test_id,
                attempt,
                kind = err.kind(),
                error = %err,
                "test failed"
            ),
        }
        TestOutcome {
            test_id: test_id.to_string(),
            attempts: attempt,
            duration,
            error: result.err(),
            screenshot,
            failures,
        }
    }

    /// Run a test up to `max_retries + 1` times, each attempt in a fresh
    /// scope, stopping at the first pass
    pub async fn run_with_retries<F, Fut>(
        self: &Arc<Self>,
        test_id: &str,
        max_retries: u32,
        body: F,
    ) -> TestOutcome
    where
        F: Fn(TestScope) -> Fut,
        Fut: Future<Output = VitrineResult<()>>,
    {
        let mut attempt = 1;
        loop {
            let outcome = self.run_test(test_id, attempt, &body).await;
            if outcome.passed() || attempt > max_retries {
                return outcome;
            }
            warn!(test = test_id, attempt, "retrying");
            attempt += 1;
        }
    }

    /// Close the browser
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to shut down.
    pub async fn shutdown(&self) -> VitrineResult<()> {
        let snapshot = self.snapshot();
        info!(
            created = snapshot.contexts_created,
            destroyed = snapshot.contexts_destroyed,
            "closing browser"
        );
        self.browser.close().await
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// File name stem safe for any filesystem
fn sanitize_test_id(test_id: &str) -> String {
    test_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<test-id>_<UTC timestamp>.png`
#[must_use]
pub fn screenshot_file_name(test_id: &str, at: chrono::DateTime<chrono::Utc>) -> String {
    format!(
        "{}_{}.png",
        sanitize_test_id(test_id),
        at.format("%Y%m%dT%H%M%S%.3fZ")
    )
}

// ============================================================================
// Test scope
// ============================================================================

struct ScopeInner {
    test_id: String,
    attempt: u32,
    fixture: Arc<BrowserFixture>,
    page: Mutex<Option<Arc<dyn PageDriver>>>,
    ui: Interactions,
    recorder: Arc<FailureRecorder>,
    data: Mutex<TestDataGenerator>,
}

/// One test attempt's browsing context, page factories and data
#[derive(Clone)]
pub struct TestScope {
    inner: Arc<ScopeInner>,
}

impl fmt::Debug for TestScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestScope")
            .field("test_id", &self.inner.test_id)
            .field("attempt", &self.inner.attempt)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl TestScope {
    #[must_use]
    pub fn test_id(&self) -> &str {
        &self.inner.test_id
    }

    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.inner.attempt
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        self.inner.fixture.config()
    }

    /// Interaction capability bound to this scope's context
    #[must_use]
    pub fn interactions(&self) -> Interactions {
        self.inner.ui.clone()
    }

    /// Whether the browsing context is still open
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner
            .page
            .lock()
            .map(|page| page.is_some())
            .unwrap_or(false)
    }

    /// Failed operations recorded so far
    #[must_use]
    pub fn failures(&self) -> Vec<OperationFailure> {
        self.inner.recorder.failures()
    }

    #[must_use]
    pub fn login_page(&self) -> LoginPage {
        LoginPage::new(self.interactions())
    }

    #[must_use]
    pub fn inventory_page(&self) -> InventoryPage {
        InventoryPage::new(self.interactions())
    }

    #[must_use]
    pub fn cart_page(&self) -> CartPage {
        CartPage::new(self.interactions())
    }

    #[must_use]
    pub fn checkout_information_page(&self) -> CheckoutInformationPage {
        CheckoutInformationPage::new(self.interactions())
    }

    #[must_use]
    pub fn checkout_overview_page(&self) -> CheckoutOverviewPage {
        CheckoutOverviewPage::new(self.interactions())
    }

    #[must_use]
    pub fn checkout_complete_page(&self) -> CheckoutCompletePage {
        CheckoutCompletePage::new(self.interactions())
    }

    /// Build a page by capability name
    ///
    /// # Errors
    ///
    /// Returns `FixtureError` for an unregistered capability.
    pub fn page(&self, capability: &str) -> VitrineResult<AnyPage> {
        let factory = self.inner.fixture.factories().get(capability).ok_or_else(|| {
            VitrineError::fixture(format!(
                "unknown page capability '{capability}' (known: {})",
                self.inner.fixture.factories().names().join(", ")
            ))
        })?;
        Ok(factory(self.interactions()))
    }

    /// Log in with the configured credential of `role` and wait for the
    /// inventory
    ///
    /// # Errors
    ///
    /// Returns an error if login does not reach the inventory.
    pub async fn logged_in(&self, role: UserRole) -> VitrineResult<InventoryPage> {
        let credential = self.config().credentials.get(role)?.clone();
        debug!(test = self.test_id(), role = role.as_str(), "logging in");
        let login = self.login_page();
        login.open().await?;
        login.login(&credential.username, &credential.password).await?;
        let inventory = self.inventory_page();
        inventory.wait_until_loaded().await?;
        Ok(inventory)
    }

    /// Log in as the standard user, add the first `n` products and open
    /// the cart
    ///
    /// # Errors
    ///
    /// Returns `FixtureError` when fewer than `n` products are listed.
    pub async fn cart_with_items(&self, n: usize) -> VitrineResult<CartPage> {
        let inventory = self.logged_in(UserRole::Standard).await?;
        let names = inventory.product_names().await?;
        if n > names.len() {
            return Err(VitrineError::fixture(format!(
                "cart_with_items({n}) but only {} products are listed",
                names.len()
            )));
        }
        for name in names.iter().take(n) {
            inventory.add_to_cart(name).await?;
        }
        inventory.header().open_cart().await?;
        let cart = self.cart_page();
        cart.wait_until_loaded().await?;
        Ok(cart)
    }

    /// Fresh valid checkout record from this scope's generator
    ///
    /// # Errors
    ///
    /// Returns `GenerationConstraintViolation` if the record is invalid.
    pub fn checkout_record(&self) -> VitrineResult<CheckoutRecord> {
        self.with_data(TestDataGenerator::checkout_record)?
    }

    /// Fresh valid user identity from this scope's generator
    ///
    /// # Errors
    ///
    /// Returns `GenerationConstraintViolation` if the record is invalid.
    pub fn user_identity(&self) -> VitrineResult<UserIdentity> {
        self.with_data(TestDataGenerator::user_identity)?
    }

    /// Borrow this scope's data generator
    ///
    /// # Errors
    ///
    /// Returns `FixtureError` if the generator lock is poisoned.
    pub fn with_data<R>(&self, f: impl FnOnce(&mut TestDataGenerator) -> R) -> VitrineResult<R> {
        let mut data = self
            .inner
            .data
            .lock()
            .map_err(|_| VitrineError::fixture("test data generator poisoned"))?;
        Ok(f(&mut data))
    }

    fn page_driver(&self) -> Option<Arc<dyn PageDriver>> {
        self.inner.page.lock().ok().and_then(|page| page.clone())
    }

    /// Write the failure screenshot for this attempt. Uses the evidence
    /// captured when `error` was raised, else captures now.
    async fn save_failure_screenshot(&self, error: &VitrineError) -> Option<PathBuf> {
        let config = self.config();
        if !config.screenshot_on_failure {
            return None;
        }
        let shot = match self.inner.recorder.take_evidence_for(error) {
            Some(shot) => shot,
            None => match self.page_driver()?.screenshot().await {
                Ok(shot) => shot,
                Err(err) => {
                    warn!(test = self.test_id(), error = %err, "failure screenshot unavailable");
                    return None;
                }
            },
        };
        let path = config
            .screenshot_dir
            .join(screenshot_file_name(self.test_id(), chrono::Utc::now()));
        let written = async {
            tokio::fs::create_dir_all(&config.screenshot_dir).await?;
            tokio::fs::write(&path, &shot.data).await
        };
        match written.await {
            Ok(()) => {
                let _ = self
                    .inner
                    .fixture
                    .counters
                    .screenshots
                    .fetch_add(1, Ordering::SeqCst);
                warn!(test = self.test_id(), path = %path.display(), "failure screenshot saved");
                Some(path)
            }
            Err(err) => {
                warn!(test = self.test_id(), error = %err, "failure screenshot not written");
                None
            }
        }
    }

    /// Close the browsing context. Idempotent.
    pub async fn teardown(&self) {
        let page = self.inner.page.lock().ok().and_then(|mut page| page.take());
        if let Some(page) = page {
            self.inner.fixture.close_context(page).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{BrowserKind, DriverBackend};

    fn fixture_in(dir: &std::path::Path) -> Arc<BrowserFixture> {
        let config = RunConfig {
            driver: DriverBackend::Simulated,
            default_timeout_ms: 300,
            test_timeout_ms: 5_000,
            screenshot_dir: dir.join("shots"),
            data_seed: Some(7),
            ..RunConfig::default()
        };
        let browser = SimulatedBrowser::new(BrowserKind::Chromium, config.base_url.clone());
        Arc::new(BrowserFixture::new(Arc::new(config), Arc::new(browser)))
    }

    fn shots(dir: &std::path::Path) -> Vec<String> {
        std::fs::read_dir(dir.join("shots"))
            .map(|entries| {
                entries
                    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    mod lifecycle_tests {
        use super::*;

        #[tokio::test]
        async fn test_success_closes_context_without_screenshot() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture_in(dir.path());
            let outcome = fixture
                .run_test("login-ok", 1, |scope| async move {
                    let _ = scope.logged_in(UserRole::Standard).await?;
                    Ok(())
                })
                .await;
            assert!(outcome.passed(), "{:?}", outcome.error);
            assert!(outcome.screenshot.is_none());
            let snapshot = fixture.snapshot();
            assert!(snapshot.is_balanced());
            assert_eq!(snapshot.contexts_created, 1);
            assert_eq!(snapshot.screenshots_saved, 0);
            assert!(shots(dir.path()).is_empty());
        }

        #[tokio::test]
        async fn test_failure_keeps_named_screenshot() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture_in(dir.path());
            let outcome = fixture
                .run_test("cart/missing product", 1, |scope| async move {
                    let inventory = scope.logged_in(UserRole::Standard).await?;
                    inventory.add_to_cart("Sauce Labs Hoverboard").await
                })
                .await;
            assert!(matches!(outcome.error, Some(VitrineError::ProductNotFound { .. })));
            let path = outcome.screenshot.unwrap();
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with("cart_missing_product_"), "{name}");
            assert!(name.ends_with(".png"));
            assert_eq!(&std::fs::read(&path).unwrap()[..4], b"\x89PNG");
            assert!(fixture.snapshot().is_balanced());
            assert_eq!(fixture.snapshot().screenshots_saved, 1);
        }

        #[tokio::test]
        async fn test_operation_failure_uses_hook_evidence() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture_in(dir.path());
            let outcome = fixture
                .run_test("missing-element", 1, |scope| async move {
                    let cart = scope.cart_page();
                    cart.checkout().await
                })
                .await;
            assert!(matches!(outcome.error, Some(VitrineError::ElementNotFound { .. })));
            assert_eq!(outcome.failures.len(), 1);
            assert_eq!(outcome.failures[0].operation, "click");
            assert!(outcome.screenshot.is_some());
        }

        #[tokio::test]
        #[allow(unreachable_code)]
        async fn test_panic_is_contained() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture_in(dir.path());
            let outcome = fixture
                .run_test("panics", 1, |_scope| async move {
                    panic!("boom");
                    Ok::<(), VitrineError>(())
                })
                .await;
            match outcome.error {
                Some(VitrineError::TestPanicked { message }) => assert_eq!(message, "boom"),
                other => panic!("unexpected {other:?}"),
            }
            assert!(fixture.snapshot().is_balanced());
        }

        #[tokio::test]
        async fn test_timeout_is_contained() {
            let dir = tempfile::tempdir().unwrap();
            let config = RunConfig {
                driver: DriverBackend::Simulated,
                test_timeout_ms: 50,
                screenshot_on_failure: false,
                screenshot_dir: dir.path().join("shots"),
                ..RunConfig::default()
            };
            let browser = SimulatedBrowser::new(BrowserKind::Chromium, config.base_url.clone());
            let fixture = Arc::new(BrowserFixture::new(Arc::new(config), Arc::new(browser)));
            let outcome = fixture
                .run_test("slow", 1, |_scope| async move {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(())
                })
                .await;
            assert!(matches!(outcome.error, Some(VitrineError::Timeout { ms: 50, .. })));
            assert!(outcome.screenshot.is_none());
            assert!(fixture.snapshot().is_balanced());
        }

        #[tokio::test]
        async fn test_pages_detach_after_teardown() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture_in(dir.path());
            let scope = fixture.open_scope("detach", 1).await.unwrap();
            let login = scope.login_page();
            login.open().await.unwrap();
            scope.teardown().await;
            scope.teardown().await;
            assert!(!scope.is_open());
            let err = login.open().await.unwrap_err();
            assert_eq!(err.to_string(), "Page error: browsing context closed");
            assert_eq!(fixture.snapshot().contexts_destroyed, 1);
        }
    }

    mod evidence_tests {
        use super::*;

        fn failure_for(error: &VitrineError) -> OperationFailure {
            OperationFailure {
                operation: "click",
                locator: Some("checkout button".to_string()),
                kind: error.kind(),
                message: error.to_string(),
            }
        }

        #[tokio::test]
        async fn test_recovered_failure_evidence_is_not_reused() {
            let browser = SimulatedBrowser::new(BrowserKind::Chromium, "https://www.saucedemo.com");
            let page = browser.new_context(&ContextOptions::default()).await.unwrap();
            let recorder = FailureRecorder::new(true);
            let handled = VitrineError::ElementNotFound {
                locator: "checkout button".to_string(),
                timeout_ms: 300,
            };
            recorder.on_failure(&failure_for(&handled), page.as_ref()).await;

            let last = VitrineError::AssertionFailed {
                message: "badge shows 0".to_string(),
            };
            assert!(recorder.take_evidence_for(&last).is_none());
            assert_eq!(recorder.failures().len(), 1);
        }

        #[tokio::test]
        async fn test_latest_failure_evidence_matches_final_error() {
            let browser = SimulatedBrowser::new(BrowserKind::Chromium, "https://www.saucedemo.com");
            let page = browser.new_context(&ContextOptions::default()).await.unwrap();
            let recorder = FailureRecorder::new(true);
            let first = VitrineError::page("stale element");
            let second = VitrineError::ElementNotFound {
                locator: "finish button".to_string(),
                timeout_ms: 300,
            };
            recorder.on_failure(&failure_for(&first), page.as_ref()).await;
            recorder.on_failure(&failure_for(&second), page.as_ref()).await;

            assert!(recorder.take_evidence_for(&second).is_some());
            assert!(recorder.take_evidence_for(&second).is_none());
        }

        #[tokio::test]
        async fn test_recovered_failure_still_gets_fresh_screenshot() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture_in(dir.path());
            let outcome = fixture
                .run_test("recovered", 1, |scope| async move {
                    scope.login_page().open().await?;
                    assert!(scope.cart_page().checkout().await.is_err());
                    Err(VitrineError::AssertionFailed {
                        message: "later check failed".to_string(),
                    })
                })
                .await;
            assert!(matches!(outcome.error, Some(VitrineError::AssertionFailed { .. })));
            assert_eq!(outcome.failures.len(), 1);
            assert!(outcome.screenshot.is_some());
            assert_eq!(shots(dir.path()).len(), 1);
            assert!(fixture.snapshot().is_balanced());
        }
    }

    mod retry_tests {
        use super::*;
        use std::sync::atomic::AtomicU32;

        #[tokio::test]
        async fn test_retry_until_pass_with_fresh_scopes() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture_in(dir.path());
            let calls = Arc::new(AtomicU32::new(0));
            let outcome = fixture
                .run_with_retries("flaky", 2, |scope| {
                    let calls = Arc::clone(&calls);
                    async move {
                        let n = calls.fetch_add(1, Ordering::SeqCst);
                        assert_eq!(scope.attempt(), n + 1);
                        if n == 0 {
                            Err(VitrineError::AssertionFailed {
                                message: "first attempt".to_string(),
                            })
                        } else {
                            Ok(())
                        }
                    }
                })
                .await;
            assert!(outcome.passed());
            assert_eq!(outcome.attempts, 2);
            assert_eq!(fixture.snapshot().contexts_created, 2);
            assert!(fixture.snapshot().is_balanced());
        }

        #[tokio::test]
        async fn test_retries_are_bounded() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture_in(dir.path());
            let outcome = fixture
                .run_with_retries("always-fails", 1, |_scope| async move {
                    Err::<(), _>(VitrineError::AssertionFailed {
                        message: "nope".to_string(),
                    })
                })
                .await;
            assert!(!outcome.passed());
            assert_eq!(outcome.attempts, 2);
            assert_eq!(fixture.snapshot().contexts_created, 2);
        }
    }

    mod data_tests {
        use super::*;

        #[tokio::test]
        async fn test_scopes_under_one_seed_draw_different_data() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture_in(dir.path());
            let first = fixture.open_scope("checkout-a", 1).await.unwrap();
            let second = fixture.open_scope("checkout-b", 1).await.unwrap();
            let a = first.user_identity().unwrap();
            let b = second.user_identity().unwrap();
            assert_ne!(a.username, b.username);
            first.teardown().await;
            second.teardown().await;
        }

        #[tokio::test]
        async fn test_same_attempt_replays_its_data() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture_in(dir.path());
            let first = fixture.open_scope("checkout-a", 2).await.unwrap();
            let a = first.user_identity().unwrap();
            first.teardown().await;
            let again = fixture.open_scope("checkout-a", 2).await.unwrap();
            assert_eq!(again.user_identity().unwrap().username, a.username);
            again.teardown().await;
            assert!(fixture.snapshot().is_balanced());
        }
    }

    mod factory_tests {
        use super::*;

        #[tokio::test]
        async fn test_factories_observe_same_state() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture_in(dir.path());
            let scope = fixture.open_scope("factories", 1).await.unwrap();
            let inventory = scope.logged_in(UserRole::Standard).await.unwrap();
            inventory.add_to_cart("Sauce Labs Onesie").await.unwrap();
            let a = scope.inventory_page().header().cart_badge_count().await.unwrap();
            let b = scope
                .page("inventory_page")
                .unwrap()
                .into_inventory()
                .unwrap()
                .header()
                .cart_badge_count()
                .await
                .unwrap();
            assert_eq!(a, 1);
            assert_eq!(a, b);
            scope.teardown().await;
        }

        #[tokio::test]
        async fn test_unknown_capability() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture_in(dir.path());
            let scope = fixture.open_scope("unknown", 1).await.unwrap();
            let err = scope.page("admin_page").unwrap_err();
            assert!(matches!(err, VitrineError::FixtureError { .. }));
            assert!(err.to_string().contains("login_page"));
            scope.teardown().await;
        }

        #[tokio::test]
        async fn test_cart_with_items() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = fixture_in(dir.path());
            let scope = fixture.open_scope("cart", 1).await.unwrap();
            let cart = scope.cart_with_items(2).await.unwrap();
            assert_eq!(cart.item_count().await.unwrap(), 2);
            let err = scope.cart_with_items(7).await.unwrap_err();
            assert!(matches!(err, VitrineError::FixtureError { .. }));
            scope.teardown().await;
        }

        #[test]
        fn test_factory_names() {
            assert_eq!(
                PageFactories::standard().names(),
                vec![
                    "cart_page",
                    "checkout_complete_page",
                    "checkout_information_page",
                    "checkout_overview_page",
                    "inventory_page",
                    "login_page",
                ]
            );
        }

        #[test]
        fn test_screenshot_file_name() {
            let at = chrono::DateTime::parse_from_rfc3339("2026-03-01T12:30:45.123Z")
                .unwrap()
                .with_timezone(&chrono::Utc);
            assert_eq!(
                screenshot_file_name("checkout::e2e flow", at),
                "checkout__e2e_flow_20260301T123045.123Z.png"
            );
        }
    }
}
