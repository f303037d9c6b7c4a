//! Built-in scenario catalog for the Sauce Demo storefront.
//!
//! Scenarios are grouped by suite; the suite is the part of the name before
//! the colon. Every scenario carries its suite marker plus any of
//! `smoke`, `regression`, `negative`, `security` and `e2e`.

mod cart;
mod checkout;
mod inventory;
mod login;
mod navigation;
mod security;
mod sorting;

use crate::harness::Scenario;
use crate::selection::Selection;

/// Markers used by the catalog
pub const MARKERS: [&str; 11] = [
    "smoke",
    "regression",
    "login",
    "inventory",
    "cart",
    "checkout",
    "sorting",
    "navigation",
    "security",
    "negative",
    "e2e",
];

/// Suites in catalog order
pub const SUITES: [&str; 7] = [
    "login",
    "inventory",
    "sorting",
    "cart",
    "checkout",
    "navigation",
    "security",
];

/// Every built-in scenario, suite by suite
#[must_use]
pub fn catalog() -> Vec<Scenario> {
    let mut all = login::scenarios();
    all.extend(inventory::scenarios());
    all.extend(sorting::scenarios());
    all.extend(cart::scenarios());
    all.extend(checkout::scenarios());
    all.extend(navigation::scenarios());
    all.extend(security::scenarios());
    all
}

/// Scenarios of the catalog matching `selection`, in catalog order
#[must_use]
pub fn select(selection: &Selection) -> Vec<Scenario> {
    catalog()
        .into_iter()
        .filter(|scenario| scenario.is_selected(selection))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{BrowserKind, DriverBackend, RunConfig};
    use crate::fixture::BrowserFixture;
    use crate::harness::TestHarness;
    use crate::simulation::SimulatedBrowser;
    use std::collections::HashSet;
    use std::sync::Arc;

    mod catalog_tests {
        use super::*;

        #[test]
        fn test_names_unique() {
            let catalog = catalog();
            let names: HashSet<&str> = catalog.iter().map(Scenario::name).collect();
            assert_eq!(names.len(), catalog.len());
        }

        #[test]
        fn test_markers_known_and_suite_marked() {
            for scenario in catalog() {
                assert!(SUITES.contains(&scenario.suite()), "{}", scenario.name());
                assert!(
                    scenario.markers().contains(&scenario.suite()),
                    "{} lacks its suite marker",
                    scenario.name()
                );
                for marker in scenario.markers() {
                    assert!(MARKERS.contains(marker), "{}: {marker}", scenario.name());
                }
            }
        }

        #[test]
        fn test_suites_in_order() {
            let mut seen: Vec<String> = Vec::new();
            for scenario in catalog() {
                if seen.last().map(String::as_str) != Some(scenario.suite()) {
                    seen.push(scenario.suite().to_string());
                }
            }
            assert_eq!(seen, SUITES.to_vec());
        }

        #[test]
        fn test_select_by_marker() {
            let e2e = select(&Selection::all().with_markers("e2e").unwrap());
            assert!(!e2e.is_empty());
            assert!(e2e.iter().all(|s| s.markers().contains(&"e2e")));
            let smoke_not_login =
                select(&Selection::all().with_markers("smoke and not login").unwrap());
            assert!(smoke_not_login.iter().all(|s| s.suite() != "login"));
        }
    }

    mod simulated_run_tests {
        use super::*;

        #[tokio::test]
        async fn test_catalog_passes_on_simulated_storefront() {
            let dir = tempfile::tempdir().unwrap();
            let config = RunConfig {
                driver: DriverBackend::Simulated,
                default_timeout_ms: 1_000,
                parallelism: 4,
                retries: 0,
                data_seed: Some(7),
                screenshot_dir: dir.path().join("shots"),
                ..RunConfig::default()
            };
            let browser = SimulatedBrowser::new(BrowserKind::Chromium, config.base_url.clone());
            let fixture = Arc::new(BrowserFixture::new(Arc::new(config), Arc::new(browser)));

            let results = TestHarness::new(Arc::clone(&fixture)).run(&catalog()).await;

            let failed: Vec<String> = results
                .iter()
                .filter(|r| !r.status.is_passed())
                .map(|r| format!("{}: {}", r.name, r.error.clone().unwrap_or_default()))
                .collect();
            assert!(failed.is_empty(), "{failed:#?}");
            assert!(fixture.snapshot().is_balanced());
            assert_eq!(fixture.snapshot().screenshots_saved, 0);
        }
    }
}
