//! Locators: symbolic element names bound to selectors.
//!
//! Every page module declares its locators as `const` items, so the set of
//! elements a page object can touch is fixed when the type is defined and
//! never varies per instance. Dynamic locators (per-product buttons) are
//! derived from a product name with [`slugify`].

use std::borrow::Cow;
use std::fmt;

/// Attribute the storefront uses for stable test hooks
pub const TEST_ID_ATTRIBUTE: &str = "data-test";

/// Selector for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (e.g., ".inventory_item_name")
    Css(Cow<'static, str>),
    /// Test ID selector (`data-test` attribute)
    TestId(Cow<'static, str>),
    /// CSS selector filtered by contained text
    CssWithText {
        /// Base CSS selector
        css: Cow<'static, str>,
        /// Text content to match
        text: Cow<'static, str>,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<Cow<'static, str>>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<Cow<'static, str>>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a CSS selector with a text filter
    #[must_use]
    pub fn css_with_text(
        css: impl Into<Cow<'static, str>>,
        text: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// CSS part of the selector
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Css(css) | Self::CssWithText { css, .. } => css.to_string(),
            Self::TestId(id) => format!("[{TEST_ID_ATTRIBUTE}=\"{id}\"]"),
        }
    }

    /// Text filter, if any
    #[must_use]
    pub fn text_filter(&self) -> Option<&str> {
        match self {
            Self::CssWithText { text, .. } => Some(&**text),
            Self::Css(_) | Self::TestId(_) => None,
        }
    }

    /// JavaScript expression evaluating to the array of matching elements
    #[must_use]
    pub fn to_query_all(&self) -> String {
        let css = self.to_css();
        match self.text_filter() {
            Some(text) => format!(
                "Array.from(document.querySelectorAll({css:?})).filter(el => el.textContent.includes({text:?}))"
            ),
            None => format!("Array.from(document.querySelectorAll({css:?}))"),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.text_filter() {
            Some(text) => write!(f, "{} >> text={text:?}", self.to_css()),
            None => f.write_str(&self.to_css()),
        }
    }
}

/// Named selector scoped to one page object type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    name: Cow<'static, str>,
    selector: Selector,
}

impl Locator {
    /// Const locator over a CSS selector
    #[must_use]
    pub const fn css(name: &'static str, css: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            selector: Selector::Css(Cow::Borrowed(css)),
        }
    }

    /// Const locator over a `data-test` id
    #[must_use]
    pub const fn test_id(name: &'static str, id: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            selector: Selector::TestId(Cow::Borrowed(id)),
        }
    }

    /// Locator computed at runtime
    #[must_use]
    pub fn dynamic(name: impl Into<Cow<'static, str>>, selector: Selector) -> Self {
        Self {
            name: name.into(),
            selector,
        }
    }

    /// Narrow this locator to elements containing `text`
    #[must_use]
    pub fn with_text(&self, text: impl Into<Cow<'static, str>>) -> Self {
        let css: Cow<'static, str> = Cow::Owned(self.selector.to_css());
        Self {
            name: Cow::Owned(format!("{}[text]", self.name)),
            selector: Selector::css_with_text(css, text),
        }
    }

    /// Symbolic name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.selector)
    }
}

/// Product name to the slug used in per-product test ids.
///
/// `"Sauce Labs Bolt T-Shirt"` becomes `"sauce-labs-bolt-t-shirt"`.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}
