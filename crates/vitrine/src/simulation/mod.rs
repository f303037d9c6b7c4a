//! In-process Sauce Demo storefront backend.
//!
//! [`SimulatedBrowser`] implements [`BrowserDriver`] without a browser
//! process. Every browsing context gets its own storefront state (session,
//! cart, sort order, form inputs) so contexts are isolated the same way CDP
//! browser contexts are. Element visibility and enabled state are modeled,
//! which makes not-found and not-actionable failures observable.
//!
//! Role behaviors:
//! - `locked_out_user` cannot log in.
//! - `problem_user` cannot sort, types last names into the first-name field
//!   and sees disabled "Remove" buttons on the inventory.
//! - `performance_glitch_user` waits for the inventory to render.
//! - `error_user` cannot finish an order.

mod dom;
mod storefront;

pub use storefront::{Product, CATALOG};

use crate::config::{BrowserKind, Viewport};
use crate::driver::{BrowserDriver, ContextOptions, ElementSnapshot, PageDriver, Screenshot};
use crate::locator::Selector;
use crate::result::{VitrineError, VitrineResult};
use async_trait::async_trait;
use dom::{Action, Matcher};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use storefront::{Storefront, BLANK};

/// Inventory render delay for `performance_glitch_user`
pub const DEFAULT_PERFORMANCE_DELAY: Duration = Duration::from_millis(400);

/// Screenshots are rendered at this fraction of the viewport
const SCREENSHOT_SCALE: u32 = 20;

/// Browser backend serving the storefront in-process
#[derive(Debug, Clone)]
pub struct SimulatedBrowser {
    kind: BrowserKind,
    base_url: String,
    performance_delay: Duration,
    next_context: Arc<AtomicU64>,
    open_contexts: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl SimulatedBrowser {
    /// Serve the storefront under `base_url`
    #[must_use]
    pub fn new(kind: BrowserKind, base_url: impl Into<String>) -> Self {
        Self {
            kind,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            performance_delay: DEFAULT_PERFORMANCE_DELAY,
            next_context: Arc::new(AtomicU64::new(1)),
            open_contexts: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Override the `performance_glitch_user` delay
    #[must_use]
    pub const fn with_performance_delay(mut self, delay: Duration) -> Self {
        self.performance_delay = delay;
        self
    }

    /// Contexts opened and not yet closed
    #[must_use]
    pub fn open_contexts(&self) -> usize {
        self.open_contexts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserDriver for SimulatedBrowser {
    fn kind(&self) -> BrowserKind {
        self.kind
    }

    async fn new_context(&self, options: &ContextOptions) -> VitrineResult<Box<dyn PageDriver>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(VitrineError::BrowserLaunchError {
                message: "browser already closed".to_string(),
            });
        }
        let id = self.next_context.fetch_add(1, Ordering::SeqCst);
        let _ = self.open_contexts.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(context = id, "simulated browsing context opened");
        Ok(Box::new(SimulatedPage {
            context_id: format!("sim-{id}"),
            base_url: self.base_url.clone(),
            viewport: options.viewport,
            slow_mo: options.slow_mo,
            state: Mutex::new(Storefront::new(self.performance_delay)),
            closed: AtomicBool::new(false),
            open_contexts: Arc::clone(&self.open_contexts),
        }))
    }

    async fn close(&self) -> VitrineResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Page of one simulated browsing context
#[derive(Debug)]
pub struct SimulatedPage {
    context_id: String,
    base_url: String,
    viewport: Viewport,
    slow_mo: Duration,
    state: Mutex<Storefront>,
    closed: AtomicBool,
    open_contexts: Arc<AtomicUsize>,
}

impl SimulatedPage {
    fn store(&self) -> VitrineResult<MutexGuard<'_, Storefront>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(VitrineError::page("browsing context closed"));
        }
        self.state
            .lock()
            .map_err(|_| VitrineError::page("storefront state poisoned"))
    }

    fn path_for(&self, url: &str) -> VitrineResult<String> {
        if url == BLANK {
            return Ok(BLANK.to_string());
        }
        let rest = if let Some(rest) = url.strip_prefix(&self.base_url) {
            rest
        } else if url.starts_with('/') {
            url
        } else {
            return Err(VitrineError::NavigationError {
                url: url.to_string(),
                message: format!("host not served (storefront is at {})", self.base_url),
            });
        };
        let path = rest.split(['?', '#']).next().unwrap_or_default();
        if path.is_empty() {
            Ok("/".to_string())
        } else if path.starts_with('/') {
            Ok(path.to_string())
        } else {
            Err(VitrineError::NavigationError {
                url: url.to_string(),
                message: "host not served".to_string(),
            })
        }
    }

    /// Resolve the `index`-th match and apply `apply` to its action
    fn act<F>(&self, selector: &Selector, index: usize, apply: F) -> VitrineResult<()>
    where
        F: FnOnce(&mut Storefront, Action, Instant) -> Result<(), String>,
    {
        let matcher = Matcher::compile(selector)
            .map_err(|e| VitrineError::page(format!("invalid selector {selector}: {e}")))?;
        let mut store = self.store()?;
        let now = Instant::now();
        let nodes = store.render(now);
        let node = matcher
            .select(&nodes)
            .get(index)
            .copied()
            .ok_or_else(|| VitrineError::page(format!("no element #{index} for {selector}")))?;
        if !node.visible {
            return Err(VitrineError::page(format!("{selector} is not visible")));
        }
        if !node.enabled {
            return Err(VitrineError::page(format!("{selector} is disabled")));
        }
        let action = node.action;
        apply(&mut *store, action, now).map_err(VitrineError::page)
    }

    async fn settle(&self) {
        if !self.slow_mo.is_zero() {
            tokio::time::sleep(self.slow_mo).await;
        }
    }
}

#[async_trait]
impl PageDriver for SimulatedPage {
    fn context_id(&self) -> &str {
        &self.context_id
    }

    async fn navigate(&self, url: &str) -> VitrineResult<()> {
        let path = self.path_for(url)?;
        self.store()?.open(&path);
        self.settle().await;
        Ok(())
    }

    async fn current_url(&self) -> VitrineResult<String> {
        let store = self.store()?;
        if store.path() == BLANK {
            Ok(BLANK.to_string())
        } else {
            Ok(format!("{}{}", self.base_url, store.path()))
        }
    }

    async fn title(&self) -> VitrineResult<String> {
        Ok(self.store()?.title().to_string())
    }

    async fn query(&self, selector: &Selector) -> VitrineResult<Vec<ElementSnapshot>> {
        let matcher = Matcher::compile(selector)
            .map_err(|e| VitrineError::page(format!("invalid selector {selector}: {e}")))?;
        let nodes = self.store()?.render(Instant::now());
        Ok(matcher
            .select(&nodes)
            .into_iter()
            .map(dom::Node::snapshot)
            .collect())
    }

    async fn click(&self, selector: &Selector, index: usize) -> VitrineResult<()> {
        self.act(selector, index, |store, action, now| store.activate(action, now))?;
        self.settle().await;
        Ok(())
    }

    async fn fill(&self, selector: &Selector, index: usize, text: &str) -> VitrineResult<()> {
        self.act(selector, index, |store, action, _| store.fill(action, text))?;
        self.settle().await;
        Ok(())
    }

    async fn select_option(
        &self,
        selector: &Selector,
        index: usize,
        value: &str,
    ) -> VitrineResult<()> {
        self.act(selector, index, |store, action, _| store.select(action, value))?;
        self.settle().await;
        Ok(())
    }

    async fn press(&self, selector: &Selector, index: usize, key: &str) -> VitrineResult<()> {
        self.act(selector, index, |store, action, now| store.press(action, key, now))?;
        self.settle().await;
        Ok(())
    }

    async fn go_back(&self) -> VitrineResult<()> {
        self.store()?.back();
        Ok(())
    }

    async fn reload(&self) -> VitrineResult<()> {
        self.store()?.reload();
        Ok(())
    }

    async fn screenshot(&self) -> VitrineResult<Screenshot> {
        let (path, elements) = {
            let store = self.store()?;
            let nodes = store.render(Instant::now());
            (store.path().to_string(), nodes.len())
        };
        let width = (self.viewport.width / SCREENSHOT_SCALE).max(1);
        let height = (self.viewport.height / SCREENSHOT_SCALE).max(1);
        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        elements.hash(&mut hasher);
        let data = encode_png(width, height, hasher.finish())?;
        Ok(Screenshot::new(data, width, height))
    }

    async fn close(&self) -> VitrineResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let _ = self.open_contexts.fetch_sub(1, Ordering::SeqCst);
            tracing::debug!(context = %self.context_id, "simulated browsing context closed");
        }
        Ok(())
    }
}

/// Fresh simulated context with short timeouts, for unit tests
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) async fn test_context() -> (Arc<dyn PageDriver>, crate::interaction::Interactions) {
    let base = crate::config::DEFAULT_BASE_URL;
    let browser = SimulatedBrowser::new(BrowserKind::Chromium, base);
    let page: Arc<dyn PageDriver> = Arc::from(
        browser
            .new_context(&ContextOptions::default())
            .await
            .expect("simulated context"),
    );
    let ui = crate::interaction::Interactions::new(&page, base)
        .with_timeout(500)
        .with_poll_interval(5);
    (page, ui)
}

/// Header band over a body tinted by `seed`
fn encode_png(width: u32, height: u32, seed: u64) -> VitrineResult<Vec<u8>> {
    let [r, g, b, ..] = seed.to_le_bytes();
    let band = height / 10;
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            if y < band {
                pixels.extend_from_slice(&[19, 35, 52]);
            } else {
                let shade = u8::try_from((x + y) % 32).unwrap_or(0);
                pixels.extend_from_slice(&[
                    r / 4 + 191 - shade,
                    g / 4 + 191 - shade,
                    b / 4 + 191 - shade,
                ]);
            }
        }
    }

    let mut output = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut output, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| VitrineError::ScreenshotError {
                message: format!("Failed to write PNG header: {e}"),
            })?;
        writer
            .write_image_data(&pixels)
            .map_err(|e| VitrineError::ScreenshotError {
                message: format!("Failed to write PNG data: {e}"),
            })?;
    }
    Ok(output)
}
