//! End-to-end flows against the simulated storefront
//!
//! These tests go through the public API only: resolve a config, launch a
//! fixture, run scenarios, write reports.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use tempfile::TempDir;
use vitrine::prelude::*;
use vitrine::scenarios;

fn simulated_config(dir: &TempDir) -> Arc<RunConfig> {
    let layer = ConfigLayer::from_yaml_str(
        r"
driver: simulated
headless: true
parallelism: 3
default_timeout_ms: 1000
data_seed: 42
",
    )
    .expect("valid yaml");
    let mut config = RunConfig::default();
    config.merge(layer);
    config.screenshot_dir = dir.path().join("screenshots");
    config.report_dir = dir.path().join("reports");
    config.log_dir = dir.path().join("logs");
    config.validate().expect("valid config");
    Arc::new(config)
}

#[tokio::test]
async fn test_purchase_flow_through_fixture() {
    let dir = TempDir::new().unwrap();
    let fixture = Arc::new(BrowserFixture::launch(simulated_config(&dir)).await.unwrap());

    let outcome = fixture
        .run_test("purchase", 1, |scope| async move {
            let inventory = scope.logged_in(UserRole::Standard).await?;
            inventory.add_to_cart("Sauce Labs Backpack").await?;
            inventory.header().open_cart().await?;
            let cart = scope.cart_page();
            cart.wait_until_loaded().await?;
            cart.checkout().await?;

            let information = scope.checkout_information_page();
            information.wait_until_loaded().await?;
            information.fill_record(&scope.checkout_record()?).await?;
            information.continue_checkout().await?;

            let overview = scope.checkout_overview_page();
            overview.wait_until_loaded().await?;
            let summary = overview.summary().await?;
            Assertion::equals(&Price::from_cents(2999), &summary.subtotal).check()?;
            overview.finish().await?;

            let complete = scope.checkout_complete_page();
            complete.wait_until_loaded().await?;
            Assertion::is_true(complete.is_order_complete().await?, "order complete").check()
        })
        .await;

    assert!(outcome.passed(), "{:?}", outcome.error);
    assert!(outcome.screenshot.is_none());
    fixture.shutdown().await.unwrap();
    assert!(fixture.snapshot().is_balanced());
}

#[tokio::test]
async fn test_failed_assertion_saves_named_screenshot() {
    let dir = TempDir::new().unwrap();
    let fixture = Arc::new(BrowserFixture::launch(simulated_config(&dir)).await.unwrap());

    let outcome = fixture
        .run_test("checkout::badge", 1, |scope| async move {
            let inventory = scope.logged_in(UserRole::Standard).await?;
            Assertion::equals(&5, &inventory.header().cart_badge_count().await?).check()
        })
        .await;

    assert!(!outcome.passed());
    assert_eq!(outcome.error.as_ref().map(VitrineError::kind), Some("AssertionFailed"));
    let path = outcome.screenshot.expect("screenshot path");
    assert!(path.exists());
    assert!(path.starts_with(dir.path().join("screenshots")));
    let file_name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.ends_with(".png"), "{file_name}");
    assert!(!file_name.contains("::"), "{file_name}");
    assert_eq!(fixture.snapshot().screenshots_saved, 1);
    assert!(fixture.snapshot().is_balanced());
}

#[tokio::test]
async fn test_smoke_selection_runs_and_reports() {
    let dir = TempDir::new().unwrap();
    let config = simulated_config(&dir);
    let fixture = Arc::new(BrowserFixture::launch(Arc::clone(&config)).await.unwrap());
    let selection = Selection::all().with_markers("smoke").unwrap();
    let selected = scenarios::select(&selection);
    assert!(!selected.is_empty());

    let results = TestHarness::new(Arc::clone(&fixture)).run(&selected).await;

    let mut reporter = Reporter::new();
    for entry in results {
        reporter.record(entry);
    }
    reporter.finish(fixture.snapshot());
    assert!(reporter.all_passed(), "{}", reporter.summary());
    assert_eq!(reporter.total_count(), selected.len());

    let written = reporter
        .write_reports(&config.report_dir, &ReportFormat::ALL)
        .unwrap();
    assert_eq!(written.len(), 3);
    let json = std::fs::read_to_string(config.report_dir.join("report.json")).unwrap();
    assert!(json.contains("checkout: purchase one product end to end"));
    let junit = std::fs::read_to_string(config.report_dir.join("junit.xml")).unwrap();
    assert!(junit.contains("<testsuite"));
    assert!(fixture.snapshot().is_balanced());
}

#[tokio::test]
async fn test_unsupported_sort_leaves_order() {
    let dir = TempDir::new().unwrap();
    let fixture = Arc::new(BrowserFixture::launch(simulated_config(&dir)).await.unwrap());
    let scope = fixture.open_scope("sort", 1).await.unwrap();

    let inventory = scope.logged_in(UserRole::Standard).await.unwrap();
    let before = inventory.product_names().await.unwrap();
    let err = inventory.sort_by_name("best-sellers").await.unwrap_err();
    assert!(matches!(err, VitrineError::UnsupportedSortCriterion { .. }));
    assert_eq!(inventory.product_names().await.unwrap(), before);

    scope.teardown().await;
    assert!(!scope.is_open());
    assert!(fixture.snapshot().is_balanced());
}
