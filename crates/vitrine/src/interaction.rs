//! Base page interaction layer.
//!
//! [`Interactions`] is the capability value composed into every page
//! object. It wraps the page driver primitives with one timeout policy and
//! one error policy:
//!
//! - every element operation first waits through
//!   [`wait_for_element`](crate::wait::wait_for_element), so a locator that
//!   never matches fails with `ElementNotFound` within the timeout;
//! - single-target operations are strict, so a locator matching several
//!   elements fails with `AmbiguousLocator`;
//! - a failed operation is reported to the [`FailureHook`] (the fixture's
//!   screenshot recorder) and then returned unchanged.
//!
//! The handle to the page is non-owning. Once the test scope that owns the
//! browsing context tears it down, every operation fails with
//! `PageError("browsing context closed")`.

use crate::driver::{ElementSnapshot, PageDriver, Screenshot};
use crate::locator::Locator;
use crate::result::{VitrineError, VitrineResult};
use crate::wait::{self, WaitCondition, WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Context of a failed interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationFailure {
    /// Operation name ("click", "fill", ...)
    pub operation: &'static str,
    /// Locator description, when the operation targeted an element
    pub locator: Option<String>,
    /// Error kind
    pub kind: &'static str,
    /// Error message
    pub message: String,
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.locator {
            Some(locator) => write!(f, "{} on {locator}: {}", self.operation, self.message),
            None => write!(f, "{}: {}", self.operation, self.message),
        }
    }
}

/// Observer notified of every failed interaction
#[async_trait]
pub trait FailureHook: Send + Sync {
    /// Called once per failed operation, before the error is returned
    async fn on_failure(&self, failure: &OperationFailure, page: &dyn PageDriver);
}

/// Interaction primitives bound to one browsing context
#[derive(Clone)]
pub struct Interactions {
    page: Weak<dyn PageDriver>,
    base_url: Arc<str>,
    timeout_ms: u64,
    navigation_timeout_ms: u64,
    poll_interval_ms: u64,
    hook: Option<Arc<dyn FailureHook>>,
}

impl fmt::Debug for Interactions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interactions")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("navigation_timeout_ms", &self.navigation_timeout_ms)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("attached", &(self.page.strong_count() > 0))
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl Interactions {
    /// Bind to `page` without taking ownership of it
    #[must_use]
    pub fn new(page: &Arc<dyn PageDriver>, base_url: &str) -> Self {
        Self {
            page: Arc::downgrade(page),
            base_url: Arc::from(base_url.trim_end_matches('/')),
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            navigation_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            hook: None,
        }
    }

    /// Per-call override of the element timeout
    #[must_use]
    pub fn with_timeout(&self, timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            ..self.clone()
        }
    }

    /// Set the navigation timeout
    #[must_use]
    pub const fn with_navigation_timeout(mut self, timeout_ms: u64) -> Self {
        self.navigation_timeout_ms = timeout_ms;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Report failed operations to `hook`
    #[must_use]
    pub fn with_failure_hook(mut self, hook: Arc<dyn FailureHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Element timeout in milliseconds
    #[must_use]
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Navigation and page-load timeout in milliseconds
    #[must_use]
    pub const fn navigation_timeout_ms(&self) -> u64 {
        self.navigation_timeout_ms
    }

    /// Absolute URL of an application path
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Whether the owning browsing context is still open
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.page.strong_count() > 0
    }

    fn page(&self) -> VitrineResult<Arc<dyn PageDriver>> {
        self.page
            .upgrade()
            .ok_or_else(|| VitrineError::page("browsing context closed"))
    }

    fn wait_options(&self, strict: bool) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
            .with_strict(strict)
    }

    async fn report(&self, operation: &'static str, locator: Option<&Locator>, error: &VitrineError) {
        let failure = OperationFailure {
            operation,
            locator: locator.map(ToString::to_string),
            kind: error.kind(),
            message: error.to_string(),
        };
        tracing::warn!(%failure, "interaction failed");
        if let (Some(hook), Some(page)) = (&self.hook, self.page.upgrade()) {
            hook.on_failure(&failure, page.as_ref()).await;
        }
    }

    async fn guarded<T, Fut>(
        &self,
        operation: &'static str,
        locator: Option<&Locator>,
        body: Fut,
    ) -> VitrineResult<T>
    where
        Fut: Future<Output = VitrineResult<T>>,
    {
        match body.await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.report(operation, locator, &err).await;
                Err(err)
            }
        }
    }

    async fn resolve(
        &self,
        page: &dyn PageDriver,
        locator: &Locator,
        condition: WaitCondition,
    ) -> VitrineResult<ElementSnapshot> {
        wait::wait_for_element(page, locator, condition, &self.wait_options(true))
            .await?
            .ok_or_else(|| VitrineError::page(format!("{locator} resolved to no element")))
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Navigate to an absolute URL
    pub async fn navigate(&self, url: &str) -> VitrineResult<()> {
        self.guarded("navigate", None, async {
            let page = self.page()?;
            tracing::debug!(url, "navigate");
            let limit = Duration::from_millis(self.navigation_timeout_ms);
            tokio::time::timeout(limit, page.navigate(url))
                .await
                .map_err(|_| VitrineError::Timeout {
                    ms: self.navigation_timeout_ms,
                    waiting_for: format!("navigation to {url}"),
                })?
        })
        .await
    }

    /// Navigate to an application path
    pub async fn open(&self, path: &str) -> VitrineResult<()> {
        self.navigate(&self.url_for(path)).await
    }

    /// Current URL
    pub async fn current_url(&self) -> VitrineResult<String> {
        self.guarded("current_url", None, async { self.page()?.current_url().await })
            .await
    }

    /// Document title
    pub async fn title(&self) -> VitrineResult<String> {
        self.guarded("title", None, async { self.page()?.title().await })
            .await
    }

    /// Go back in history
    pub async fn go_back(&self) -> VitrineResult<()> {
        self.guarded("go_back", None, async { self.page()?.go_back().await })
            .await
    }

    /// Reload the page
    pub async fn reload(&self) -> VitrineResult<()> {
        self.guarded("reload", None, async { self.page()?.reload().await })
            .await
    }

    /// Wait until the current URL contains `fragment`
    pub async fn wait_for_url(&self, fragment: &str) -> VitrineResult<String> {
        self.guarded("wait_for_url", None, async {
            let page = self.page()?;
            let waiting_for = format!("URL containing {fragment:?}");
            wait::poll_until(&self.wait_options(false), &waiting_for, || {
                let page = Arc::clone(&page);
                async move {
                    let url = page.current_url().await?;
                    Ok(url.contains(fragment).then_some(url))
                }
            })
            .await
        })
        .await
    }

    /// Poll `check` until it yields a value, within `timeout_ms`
    pub async fn wait_until<F, Fut, T>(
        &self,
        waiting_for: &str,
        timeout_ms: u64,
        check: F,
    ) -> VitrineResult<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = VitrineResult<Option<T>>> + Send,
        T: Send,
    {
        let options = self.wait_options(false).with_timeout(timeout_ms);
        self.guarded("wait_until", None, async {
            wait::poll_until(&options, waiting_for, check).await
        })
        .await
    }

    // ------------------------------------------------------------------
    // Element actions
    // ------------------------------------------------------------------

    /// Click the single element matching `locator`
    pub async fn click(&self, locator: &Locator) -> VitrineResult<()> {
        self.guarded("click", Some(locator), async {
            let page = self.page()?;
            tracing::debug!(%locator, "click");
            let _ = self.resolve(page.as_ref(), locator, WaitCondition::Actionable).await?;
            page.click(locator.selector(), 0).await
        })
        .await
    }

    /// Replace the value of the single field matching `locator`
    pub async fn fill(&self, locator: &Locator, text: &str) -> VitrineResult<()> {
        self.guarded("fill", Some(locator), async {
            let page = self.page()?;
            tracing::debug!(%locator, chars = text.chars().count(), "fill");
            let _ = self.resolve(page.as_ref(), locator, WaitCondition::Actionable).await?;
            page.fill(locator.selector(), 0, text).await
        })
        .await
    }

    /// Choose an option of the single `<select>` matching `locator`
    pub async fn select_option(&self, locator: &Locator, value: &str) -> VitrineResult<()> {
        self.guarded("select_option", Some(locator), async {
            let page = self.page()?;
            tracing::debug!(%locator, value, "select_option");
            let _ = self.resolve(page.as_ref(), locator, WaitCondition::Actionable).await?;
            page.select_option(locator.selector(), 0, value).await
        })
        .await
    }

    /// Press a named key on the single element matching `locator`
    pub async fn press_key(&self, locator: &Locator, key: &str) -> VitrineResult<()> {
        self.guarded("press_key", Some(locator), async {
            let page = self.page()?;
            tracing::debug!(%locator, key, "press_key");
            let _ = self.resolve(page.as_ref(), locator, WaitCondition::Actionable).await?;
            page.press(locator.selector(), 0, key).await
        })
        .await
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Text of the single visible element matching `locator`
    pub async fn read_text(&self, locator: &Locator) -> VitrineResult<String> {
        self.guarded("read_text", Some(locator), async {
            let page = self.page()?;
            let element = self.resolve(page.as_ref(), locator, WaitCondition::Visible).await?;
            Ok(element.text)
        })
        .await
    }

    /// Current value of the single form control matching `locator`
    pub async fn input_value(&self, locator: &Locator) -> VitrineResult<String> {
        self.guarded("input_value", Some(locator), async {
            let page = self.page()?;
            let element = self.resolve(page.as_ref(), locator, WaitCondition::Attached).await?;
            Ok(element.value.unwrap_or_default())
        })
        .await
    }

    /// Attribute of the single element matching `locator`
    pub async fn attribute(&self, locator: &Locator, name: &str) -> VitrineResult<Option<String>> {
        self.guarded("attribute", Some(locator), async {
            let page = self.page()?;
            let element = self.resolve(page.as_ref(), locator, WaitCondition::Attached).await?;
            Ok(element.attribute(name).map(str::to_string))
        })
        .await
    }

    /// Whether any element matching `locator` is visible right now
    pub async fn is_visible(&self, locator: &Locator) -> VitrineResult<bool> {
        self.guarded("is_visible", Some(locator), async {
            let elements = self.page()?.query(locator.selector()).await?;
            Ok(elements.iter().any(|e| e.visible))
        })
        .await
    }

    /// Whether an element matching `locator` becomes visible within `timeout_ms`
    pub async fn is_visible_within(&self, locator: &Locator, timeout_ms: u64) -> VitrineResult<bool> {
        let page = self.page()?;
        let options = self.wait_options(false).with_timeout(timeout_ms);
        match wait::wait_for_element(page.as_ref(), locator, WaitCondition::Visible, &options).await {
            Ok(_) => Ok(true),
            Err(VitrineError::ElementNotFound { .. } | VitrineError::ElementNotActionable { .. }) => {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Number of elements matching `locator` right now
    pub async fn count(&self, locator: &Locator) -> VitrineResult<usize> {
        self.guarded("count", Some(locator), async {
            Ok(self.page()?.query(locator.selector()).await?.len())
        })
        .await
    }

    /// Texts of all elements matching `locator`, in document order
    pub async fn all_texts(&self, locator: &Locator) -> VitrineResult<Vec<String>> {
        self.guarded("all_texts", Some(locator), async {
            let elements = self.page()?.query(locator.selector()).await?;
            Ok(elements.into_iter().map(|e| e.text).collect())
        })
        .await
    }

    /// Wait until `locator` satisfies `condition`
    pub async fn wait_for(
        &self,
        locator: &Locator,
        condition: WaitCondition,
    ) -> VitrineResult<Option<ElementSnapshot>> {
        self.guarded("wait_for", Some(locator), async {
            let page = self.page()?;
            tracing::debug!(%locator, %condition, timeout_ms = self.timeout_ms, "wait_for");
            wait::wait_for_element(page.as_ref(), locator, condition, &self.wait_options(false)).await
        })
        .await
    }

    // ------------------------------------------------------------------
    // Screenshots
    // ------------------------------------------------------------------

    /// Capture the viewport
    pub async fn capture(&self) -> VitrineResult<Screenshot> {
        self.guarded("capture", None, async { self.page()?.screenshot().await })
            .await
    }

    /// Capture the viewport and write it to `path` as PNG
    pub async fn screenshot(&self, path: &Path) -> VitrineResult<Screenshot> {
        self.guarded("screenshot", None, async {
            let shot = self.page()?.screenshot().await?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, &shot.data).await?;
            tracing::debug!(path = %path.display(), bytes = shot.size_bytes(), "screenshot saved");
            Ok(shot)
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::BrowserKind;
    use crate::driver::{BrowserDriver, ContextOptions};
    use crate::simulation::SimulatedBrowser;
    use std::sync::Mutex;

    const BASE: &str = "https://www.saucedemo.com";

    const USERNAME: Locator = Locator::test_id("username", "username");
    const PASSWORD: Locator = Locator::test_id("password", "password");
    const LOGIN: Locator = Locator::test_id("login button", "login-button");
    const ERROR: Locator = Locator::test_id("error", "error");
    const MISSING: Locator = Locator::css("missing", "#does-not-exist");
    const LOGOUT: Locator = Locator::css("logout link", "#logout_sidebar_link");
    const ITEM_NAME: Locator = Locator::css("item name", ".inventory_item_name");

    #[derive(Default)]
    struct Recorder {
        failures: Mutex<Vec<OperationFailure>>,
    }

    #[async_trait]
    impl FailureHook for Recorder {
        async fn on_failure(&self, failure: &OperationFailure, _page: &dyn PageDriver) {
            self.failures.lock().unwrap().push(failure.clone());
        }
    }

    async fn page() -> Arc<dyn PageDriver> {
        let browser = SimulatedBrowser::new(BrowserKind::Chromium, BASE);
        Arc::from(browser.new_context(&ContextOptions::default()).await.unwrap())
    }

    fn fast(page: &Arc<dyn PageDriver>) -> Interactions {
        Interactions::new(page, BASE).with_timeout(200).with_poll_interval(10)
    }

    async fn log_in(ui: &Interactions) {
        ui.open("/").await.unwrap();
        ui.fill(&USERNAME, "standard_user").await.unwrap();
        ui.fill(&PASSWORD, "secret_sauce").await.unwrap();
        ui.click(&LOGIN).await.unwrap();
    }

    mod action_tests {
        use super::*;

        #[tokio::test]
        async fn test_login_flow() {
            let page = page().await;
            let ui = fast(&page);
            log_in(&ui).await;
            assert!(ui.wait_for_url("inventory.html").await.unwrap().ends_with("/inventory.html"));
            assert_eq!(ui.count(&ITEM_NAME).await.unwrap(), 6);
        }

        #[tokio::test]
        async fn test_read_text_and_input_value() {
            let page = page().await;
            let ui = fast(&page);
            ui.open("/").await.unwrap();
            ui.fill(&USERNAME, "nobody").await.unwrap();
            assert_eq!(ui.input_value(&USERNAME).await.unwrap(), "nobody");
            ui.click(&LOGIN).await.unwrap();
            assert_eq!(
                ui.read_text(&ERROR).await.unwrap(),
                "Epic sadface: Password is required"
            );
            assert_eq!(
                ui.attribute(&USERNAME, "placeholder").await.unwrap().as_deref(),
                Some("Username")
            );
        }
    }

    mod failure_tests {
        use super::*;

        #[tokio::test]
        async fn test_missing_element_is_not_found() {
            let page = page().await;
            let ui = fast(&page);
            ui.open("/").await.unwrap();
            let started = std::time::Instant::now();
            let err = ui.click(&MISSING).await.unwrap_err();
            let elapsed = started.elapsed();
            assert!(matches!(err, VitrineError::ElementNotFound { timeout_ms: 200, .. }));
            assert!(elapsed >= Duration::from_millis(200), "gave up early: {elapsed:?}");
            assert!(elapsed < Duration::from_millis(1_000), "overran the bound: {elapsed:?}");
        }

        #[tokio::test]
        async fn test_hidden_element_is_not_actionable() {
            let page = page().await;
            let ui = fast(&page);
            log_in(&ui).await;
            let err = ui.click(&LOGOUT).await.unwrap_err();
            match err {
                VitrineError::ElementNotActionable { reason, .. } => assert_eq!(reason, "hidden"),
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_multiple_matches_are_ambiguous() {
            let page = page().await;
            let ui = fast(&page);
            log_in(&ui).await;
            let err = ui.read_text(&ITEM_NAME).await.unwrap_err();
            assert!(matches!(err, VitrineError::AmbiguousLocator { count: 6, .. }));
        }

        #[tokio::test]
        async fn test_hook_sees_every_failure() {
            let page = page().await;
            let recorder = Arc::new(Recorder::default());
            let ui = fast(&page).with_failure_hook(recorder.clone());
            ui.open("/").await.unwrap();
            let _ = ui.click(&MISSING).await;
            let _ = ui.fill(&MISSING, "x").await;
            let failures = recorder.failures.lock().unwrap();
            assert_eq!(failures.len(), 2);
            assert_eq!(failures[0].operation, "click");
            assert_eq!(failures[0].kind, "ElementNotFound");
            assert!(failures[1].locator.as_deref().unwrap().starts_with("missing"));
        }

        #[tokio::test]
        async fn test_visibility_query_does_not_fail() {
            let page = page().await;
            let ui = fast(&page);
            ui.open("/").await.unwrap();
            assert!(!ui.is_visible(&ERROR).await.unwrap());
            assert!(!ui.is_visible_within(&ERROR, 30).await.unwrap());
            assert!(ui.is_visible_within(&LOGIN, 30).await.unwrap());
        }

        #[tokio::test]
        async fn test_closed_context() {
            let page = page().await;
            let ui = fast(&page);
            drop(page);
            assert!(!ui.is_attached());
            let err = ui.current_url().await.unwrap_err();
            assert_eq!(err.to_string(), "Page error: browsing context closed");
        }
    }

    mod screenshot_tests {
        use super::*;

        #[tokio::test]
        async fn test_screenshot_written() {
            let dir = tempfile::tempdir().unwrap();
            let page = page().await;
            let ui = fast(&page);
            ui.open("/").await.unwrap();
            let path = dir.path().join("nested").join("login.png");
            let shot = ui.screenshot(&path).await.unwrap();
            assert_eq!(std::fs::read(&path).unwrap(), shot.data);
        }
    }

    #[tokio::test]
    async fn test_url_for() {
        let page = page().await;
        let ui = Interactions::new(&page, "https://www.saucedemo.com/");
        assert_eq!(ui.url_for("/cart.html"), "https://www.saucedemo.com/cart.html");
        assert_eq!(ui.url_for("cart.html"), "https://www.saucedemo.com/cart.html");
    }
}
