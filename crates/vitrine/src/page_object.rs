//! Page Object Model support.
//!
//! A page object is a record composed of its locator registry and an
//! [`Interactions`] value bound to the current browsing context. Page
//! objects return observed state and never assert.

use crate::interaction::Interactions;
use crate::locator::Locator;
use crate::result::VitrineResult;
use async_trait::async_trait;
use std::collections::HashMap;
use url::Url;

/// Trait for page objects representing a page or component in the UI.
///
/// A page counts as loaded when the current URL matches
/// [`url_pattern`](PageObject::url_pattern) and its
/// [`ready_locator`](PageObject::ready_locator) is visible.
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Page name for logging/debugging
    fn page_name(&self) -> &'static str;

    /// URL pattern that matches this page (e.g., "/", "/cart.html")
    fn url_pattern(&self) -> &'static str;

    /// Element whose visibility marks the page as rendered
    fn ready_locator(&self) -> Locator;

    /// Interaction layer bound to the current context
    fn interactions(&self) -> &Interactions;

    /// Time the page gets to load (in milliseconds); the navigation
    /// timeout unless a page needs longer
    fn load_timeout_ms(&self) -> u64 {
        self.interactions().navigation_timeout_ms()
    }

    /// Whether the page is displayed and ready for interaction
    async fn is_loaded(&self) -> VitrineResult<bool> {
        let url = self.interactions().current_url().await?;
        if !UrlMatcher::new(self.url_pattern()).matches_url(&url) {
            return Ok(false);
        }
        self.interactions().is_visible(&self.ready_locator()).await
    }

    /// Wait until [`is_loaded`](PageObject::is_loaded) holds
    async fn wait_until_loaded(&self) -> VitrineResult<()> {
        let waiting_for = format!("{} to load", self.page_name());
        tracing::debug!(page = self.page_name(), "waiting for page");
        let this = self;
        self.interactions()
            .wait_until(&waiting_for, self.load_timeout_ms(), move || async move {
                Ok(this.is_loaded().await?.then_some(()))
            })
            .await
    }
}

/// URL pattern matcher for page objects
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/inventory.html`
    /// - Wildcards: `/checkout-*/*`
    /// - Named parameters: `/item/:id`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check if a path matches the pattern
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        // wildcards and parameters each consume exactly one segment
        if path_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(&path_segments)
            .all(|(segment, actual)| match segment {
                UrlSegment::Literal(lit) => lit == actual,
                UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
            })
    }

    /// Check the path of an absolute URL (query and fragment ignored)
    #[must_use]
    pub fn matches_url(&self, url: &str) -> bool {
        self.matches(&path_of(url))
    }

    /// Extract parameters from a path
    #[must_use]
    pub fn extract_params(&self, path: &str) -> HashMap<String, String> {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        self.segments
            .iter()
            .zip(&path_segments)
            .filter_map(|(segment, value)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), (*value).to_string())),
                _ => None,
            })
            .collect()
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Path component of an absolute URL.
///
/// Relative paths and URLs without a hierarchical path (`about:blank`)
/// come back as given, minus any query or fragment.
#[must_use]
pub fn path_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if !parsed.cannot_be_a_base() => parsed.path().to_string(),
        _ => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod url_matcher_tests {
        use super::*;

        #[test]
        fn test_literal_match() {
            let matcher = UrlMatcher::new("/inventory.html");
            assert!(matcher.matches("/inventory.html"));
            assert!(!matcher.matches("/cart.html"));
            assert!(!matcher.matches("/inventory.html/extra"));
        }

        #[test]
        fn test_root_pattern() {
            let matcher = UrlMatcher::new("/");
            assert!(matcher.matches("/"));
            assert!(matcher.matches(""));
            assert!(!matcher.matches("/inventory.html"));
        }

        #[test]
        fn test_wildcard_and_params() {
            let matcher = UrlMatcher::new("/item/:id");
            assert!(matcher.matches("/item/4"));
            assert_eq!(matcher.extract_params("/item/4").get("id").unwrap(), "4");
            assert!(UrlMatcher::new("/*").matches("/cart.html"));
        }

        #[test]
        fn test_matches_url() {
            let matcher = UrlMatcher::new("/cart.html");
            assert!(matcher.matches_url("https://www.saucedemo.com/cart.html"));
            assert!(matcher.matches_url("https://www.saucedemo.com/cart.html?x=1#top"));
            assert!(!matcher.matches_url("https://www.saucedemo.com/"));
            assert_eq!(matcher.pattern(), "/cart.html");
        }
    }

    mod path_of_tests {
        use super::*;

        #[test]
        fn test_path_of() {
            assert_eq!(path_of("https://www.saucedemo.com"), "/");
            assert_eq!(path_of("https://www.saucedemo.com/"), "/");
            assert_eq!(path_of("http://localhost:8080/inventory.html"), "/inventory.html");
            assert_eq!(path_of("/checkout-step-one.html?a=b"), "/checkout-step-one.html");
            assert_eq!(path_of("about:blank"), "about:blank");
        }

        #[test]
        fn test_path_of_ignores_authority_noise() {
            assert_eq!(path_of("https://user:pw@shop.test:8443/cart.html#top"), "/cart.html");
            assert_eq!(path_of("https://shop.test?next=/cart.html"), "/");
            assert_eq!(path_of("HTTPS://SHOP.TEST/inventory.html"), "/inventory.html");
        }

        #[test]
        fn test_matches_url_reads_only_the_path() {
            let matcher = UrlMatcher::new("/cart.html");
            assert!(!matcher.matches_url("https://shop.test/?redirect=/cart.html"));
            assert!(matcher.matches_url("https://shop.test:8443/cart.html"));
        }
    }
}
