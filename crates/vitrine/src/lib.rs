//! Vitrine: page objects and fixture lifecycle for browser end-to-end tests
//!
//! Vitrine drives the Sauce Demo storefront through a small driver seam:
//! a Chrome DevTools Protocol backend for real browsers and an in-process
//! simulated storefront for fast, hermetic runs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    VITRINE Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Page       │    │ Browser    │            │
//! │   │ Catalog    │───►│ Objects +  │───►│ Driver     │            │
//! │   │ + Harness  │    │ Fixture    │    │ (cdp/sim)  │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A run resolves a [`RunConfig`], launches one [`BrowserFixture`], and lets
//! the [`TestHarness`] execute selected [`Scenario`]s. Each scenario attempt
//! gets an isolated browsing context through a [`TestScope`] that is torn
//! down on every exit path.

// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod assertion;
mod browser;
#[allow(clippy::missing_errors_doc)]
mod config;
mod driver;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod fixture;
mod harness;
#[allow(clippy::missing_errors_doc)]
mod interaction;
mod locator;
mod logging;
#[allow(clippy::missing_errors_doc)]
mod page_object;

/// Page objects for the storefront views
#[allow(clippy::missing_errors_doc)]
pub mod pages;

mod price;
#[allow(clippy::missing_errors_doc)]
mod reporter;
mod result;

/// Built-in scenario catalog
pub mod scenarios;

mod selection;

/// In-process storefront backend
#[allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
pub mod simulation;

mod test_data;
mod wait;

pub use assertion::{Assertion, AssertionResult};
pub use browser::launch as launch_browser;
pub use config::{
    BrowserKind, ConfigLayer, Credential, CredentialTable, DriverBackend, EnvSource, LogLevel,
    ProcessEnv, RunConfig, UserRole, Viewport, CONFIG_FILE_ENV, DEFAULT_BASE_URL,
    DEFAULT_PASSWORD,
};
pub use driver::{BrowserDriver, ContextOptions, ElementSnapshot, PageDriver, Screenshot};
pub use fixture::{
    screenshot_file_name, AnyPage, BrowserFixture, FailureRecorder, LifecycleSnapshot,
    PageFactories, PageFactory, TestOutcome, TestScope,
};
pub use harness::{Scenario, ScenarioFuture, TestHarness};
pub use interaction::{FailureHook, Interactions, OperationFailure};
pub use locator::{slugify, Locator, Selector, TEST_ID_ATTRIBUTE};
pub use logging::{init_logging, LogFormat, LoggingConfig, LOG_FILE_NAME};
pub use page_object::{path_of, PageObject, UrlMatcher};
pub use price::Price;
pub use reporter::{ReportFormat, Reporter, RunMetadata, TestResultEntry, TestStatus};
pub use result::{VitrineError, VitrineResult};
pub use selection::{MarkerExpr, Selection};
pub use simulation::SimulatedBrowser;
pub use test_data::{
    BoundaryString, CheckoutRecord, InvalidCredentialCase, MaliciousInput, MaliciousKind, Seed,
    TestDataGenerator, UserIdentity, OVERFLOW_LENGTH, POSTAL_CODE_PATTERN,
};
pub use wait::{
    poll_until, wait_for_element, WaitCondition, WaitOptions, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WAIT_TIMEOUT_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::assertion::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::fixture::*;
    pub use super::harness::*;
    pub use super::interaction::*;
    pub use super::locator::*;
    pub use super::page_object::*;
    pub use super::pages::*;
    pub use super::price::*;
    pub use super::reporter::*;
    pub use super::result::*;
    pub use super::selection::*;
    pub use super::test_data::*;
    pub use super::wait::*;
}
