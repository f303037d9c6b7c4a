//! Smoke tests for the vitrine CLI
//!
//! Every run uses the simulated driver so no browser is needed.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the vitrine binary, isolated from the caller's VITRINE_* environment
fn vitrine() -> Command {
    let mut cmd = Command::cargo_bin("vitrine").expect("vitrine binary should exist");
    for key in [
        "VITRINE_CONFIG",
        "VITRINE_BASE_URL",
        "VITRINE_DRIVER",
        "VITRINE_PASSWORD",
        "VITRINE_WORKERS",
        "VITRINE_RETRIES",
        "VITRINE_REPORT_DIR",
        "VITRINE_SCREENSHOT_DIR",
        "VITRINE_LOG_DIR",
        "VITRINE_NAVIGATION_TIMEOUT_MS",
        "RUST_LOG",
    ] {
        let _ = cmd.env_remove(key);
    }
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    vitrine()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    vitrine()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sauce Demo"))
        .stdout(predicate::str::contains("test"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn test_no_args_fails() {
    vitrine().assert().failure();
}

#[test]
fn test_test_subcommand_help() {
    vitrine()
        .args(["test", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--markers"))
        .stdout(predicate::str::contains("--fail-fast"));
}

// ============================================================================
// List Command
// ============================================================================

#[test]
fn test_list_smoke_selection() {
    vitrine()
        .args(["list", "-m", "smoke"])
        .assert()
        .success()
        .stdout(predicate::str::contains("checkout: purchase one product end to end"))
        .stdout(predicate::str::contains("scenarios selected"));
}

#[test]
fn test_list_filter_by_name() {
    vitrine()
        .args(["list", "-k", "LOCKED"])
        .assert()
        .success()
        .stdout(predicate::str::contains("login: locked user stays on login with error"))
        .stdout(predicate::str::contains("checkout:").not());
}

#[test]
fn test_invalid_marker_expression_exits_2() {
    vitrine()
        .args(["list", "-m", "smoke and"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_empty_selection_exits_2() {
    vitrine()
        .args(["list", "-k", "no such scenario anywhere"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no scenarios match"));
}

// ============================================================================
// Config Command
// ============================================================================

#[test]
fn test_config_redacts_password() {
    vitrine()
        .args(["config", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("saucedemo.com"))
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("secret_sauce").not());
}

#[test]
fn test_config_layers_file_env_and_flags() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("vitrine.yaml");
    fs::write(&file, "base_url: http://localhost:3000\nparallelism: 2\nretries: 3\n").unwrap();

    vitrine()
        .env("VITRINE_WORKERS", "6")
        .args(["config", "--config"])
        .arg(&file)
        .args(["--retries", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:3000"))
        .stdout(predicate::str::contains("parallelism: 6"))
        .stdout(predicate::str::contains("retries: 0"));
}

#[test]
fn test_invalid_base_url_exits_2() {
    vitrine()
        .args(["config", "--base-url", "ftp://example.com"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("base_url"));
}

#[test]
fn test_unknown_config_key_exits_2() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("vitrine.yaml");
    fs::write(&file, "base_url: http://localhost:3000\nbrowsr: firefox\n").unwrap();

    vitrine()
        .args(["config", "--config"])
        .arg(&file)
        .assert()
        .code(2);
}

// ============================================================================
// Test Command
// ============================================================================

#[test]
fn test_smoke_run_writes_reports() {
    let temp = TempDir::new().unwrap();

    vitrine()
        .args(["-q", "test", "--driver", "simulated", "--headless", "-m", "smoke", "-o"])
        .arg(temp.path())
        .assert()
        .success();

    assert!(temp.path().join("report.json").exists());
    assert!(temp.path().join("junit.xml").exists());
    assert!(temp.path().join("report.html").exists());
    let json = fs::read_to_string(temp.path().join("report.json")).unwrap();
    assert!(json.contains("\"failed\": 0"));
}

#[test]
fn test_failing_run_exits_1_with_screenshot() {
    let temp = TempDir::new().unwrap();

    vitrine()
        .env("VITRINE_PASSWORD", "not_the_password")
        .env("VITRINE_NAVIGATION_TIMEOUT_MS", "500")
        .args([
            "--color",
            "never",
            "test",
            "--driver",
            "simulated",
            "--retries",
            "0",
            "-k",
            "standard user reaches inventory",
            "--format",
            "json",
            "-o",
        ])
        .arg(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("1 of 1 tests failed"));

    assert!(temp.path().join("report.json").exists());
    assert!(!temp.path().join("junit.xml").exists());
    let screenshots: Vec<_> = fs::read_dir(temp.path().join("screenshots"))
        .unwrap()
        .collect();
    assert_eq!(screenshots.len(), 1);
}

#[test]
fn test_unknown_report_format_exits_2() {
    let temp = TempDir::new().unwrap();

    vitrine()
        .args(["test", "--driver", "simulated", "--format", "json,pdf", "-o"])
        .arg(temp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("pdf"));

    assert!(!temp.path().join("report.json").exists());
}
