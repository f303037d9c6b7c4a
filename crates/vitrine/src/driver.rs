//! Browser driver abstraction.
//!
//! The interaction layer never talks to a browser directly. It goes through
//! two traits:
//!
//! - [`BrowserDriver`]: one per run (or worker), shared read-mostly; its
//!   only mutating operation is opening a new isolated browsing context.
//! - [`PageDriver`]: the single page of one browsing context. Every element
//!   operation addresses elements by `(selector, index)` after the caller
//!   has resolved the selector with [`PageDriver::query`].
//!
//! Implementations: the CDP backend in `browser` (feature `browser`) and the
//! in-process storefront in `simulation`.

use crate::config::{BrowserKind, Viewport};
use crate::locator::Selector;
use crate::result::VitrineResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

/// Observed state of one element at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementSnapshot {
    /// Lowercase tag name
    pub tag: String,
    /// Trimmed text content
    pub text: String,
    /// Rendered and not hidden
    pub visible: bool,
    /// Not disabled
    pub enabled: bool,
    /// Current value for form controls
    pub value: Option<String>,
    /// Attributes
    pub attributes: BTreeMap<String, String>,
}

impl ElementSnapshot {
    /// Visible and enabled
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        self.visible && self.enabled
    }

    /// Attribute value
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Screenshot data with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Timestamp when screenshot was taken
    pub timestamp: SystemTime,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: SystemTime::now(),
        }
    }

    /// Get the size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if screenshot is valid (has data)
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty() && self.width > 0 && self.height > 0
    }
}

/// Options for a new browsing context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Viewport size
    pub viewport: Viewport,
    /// Delay inserted after each interaction
    pub slow_mo: Duration,
    /// Navigation timeout
    pub navigation_timeout: Duration,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            slow_mo: Duration::ZERO,
            navigation_timeout: Duration::from_secs(30),
        }
    }
}

/// A browser process
#[async_trait]
pub trait BrowserDriver: Send + Sync + std::fmt::Debug {
    /// Engine behind this driver
    fn kind(&self) -> BrowserKind;

    /// Open an isolated browsing context with a single blank page
    async fn new_context(&self, options: &ContextOptions) -> VitrineResult<Box<dyn PageDriver>>;

    /// Shut the browser down
    async fn close(&self) -> VitrineResult<()>;
}

/// The page of one browsing context
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Identifier of the owning browsing context
    fn context_id(&self) -> &str;

    /// Navigate to an absolute URL
    async fn navigate(&self, url: &str) -> VitrineResult<()>;

    /// Current URL
    async fn current_url(&self) -> VitrineResult<String>;

    /// Document title
    async fn title(&self) -> VitrineResult<String>;

    /// All elements currently matching `selector`, in document order
    async fn query(&self, selector: &Selector) -> VitrineResult<Vec<ElementSnapshot>>;

    /// Click the `index`-th match
    async fn click(&self, selector: &Selector, index: usize) -> VitrineResult<()>;

    /// Replace the value of the `index`-th match
    async fn fill(&self, selector: &Selector, index: usize, text: &str) -> VitrineResult<()>;

    /// Choose an option of the `index`-th `<select>` match
    async fn select_option(
        &self,
        selector: &Selector,
        index: usize,
        value: &str,
    ) -> VitrineResult<()>;

    /// Press a named key ("Enter", "Escape", ...) on the `index`-th match
    async fn press(&self, selector: &Selector, index: usize, key: &str) -> VitrineResult<()>;

    /// Go back in history
    async fn go_back(&self) -> VitrineResult<()>;

    /// Reload the page
    async fn reload(&self) -> VitrineResult<()>;

    /// Capture the viewport as PNG
    async fn screenshot(&self) -> VitrineResult<Screenshot>;

    /// Close the page and dispose of its browsing context
    async fn close(&self) -> VitrineResult<()>;
}
