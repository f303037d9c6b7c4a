//! Wait mechanisms.
//!
//! `wait_for_element` is the single primitive every element operation goes
//! through before acting. It polls the page until the condition holds or
//! the deadline passes and never retries beyond that bound. A timeout is
//! reported according to what was last observed:
//!
//! | last observation          | error                                 |
//! |---------------------------|---------------------------------------|
//! | no element matched        | `ElementNotFound`                     |
//! | matched, but hidden       | `ElementNotActionable { "hidden" }`   |
//! | matched, but disabled     | `ElementNotActionable { "disabled" }` |
//! | still present / visible   | `Timeout`                             |
//!
//! Several matches for a strict (single-target) wait fail immediately with
//! `AmbiguousLocator`. A page query that has not answered by the deadline
//! is abandoned; with nothing observed yet the wait ends in `Timeout`.

use crate::driver::{ElementSnapshot, PageDriver};
use crate::locator::Locator;
use crate::result::{VitrineError, VitrineResult};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// State an element must reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitCondition {
    /// Present in the DOM
    Attached,
    /// Present and no longer in the DOM
    Detached,
    /// Present and rendered
    Visible,
    /// Absent or not rendered
    Hidden,
    /// Rendered and enabled
    Actionable,
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Attached => "attached",
            Self::Detached => "detached",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Actionable => "actionable",
        })
    }
}

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Fail on more than one match
    pub strict: bool,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            strict: true,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set strict mode
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Missing,
    Hidden,
    Disabled,
    StillPresent,
    StillVisible,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Observation {
    Satisfied(Option<ElementSnapshot>),
    Pending(Pending),
    Ambiguous(usize),
}

fn evaluate(condition: WaitCondition, strict: bool, mut snapshots: Vec<ElementSnapshot>) -> Observation {
    let count = snapshots.len();
    match condition {
        WaitCondition::Detached => {
            if count == 0 {
                Observation::Satisfied(None)
            } else {
                Observation::Pending(Pending::StillPresent)
            }
        }
        WaitCondition::Hidden => {
            if snapshots.iter().all(|s| !s.visible) {
                Observation::Satisfied(None)
            } else {
                Observation::Pending(Pending::StillVisible)
            }
        }
        WaitCondition::Attached | WaitCondition::Visible | WaitCondition::Actionable => {
            if count == 0 {
                return Observation::Pending(Pending::Missing);
            }
            if strict && count > 1 {
                return Observation::Ambiguous(count);
            }
            let accepts = |s: &ElementSnapshot| match condition {
                WaitCondition::Visible => s.visible,
                WaitCondition::Actionable => s.is_actionable(),
                _ => true,
            };
            if let Some(pos) = snapshots.iter().position(accepts) {
                return Observation::Satisfied(Some(snapshots.swap_remove(pos)));
            }
            if snapshots.iter().any(|s| s.visible) {
                Observation::Pending(Pending::Disabled)
            } else {
                Observation::Pending(Pending::Hidden)
            }
        }
    }
}

fn timeout_error(locator: &Locator, pending: Pending, timeout_ms: u64) -> VitrineError {
    let described = locator.to_string();
    match pending {
        Pending::Missing => VitrineError::ElementNotFound {
            locator: described,
            timeout_ms,
        },
        Pending::Hidden => VitrineError::ElementNotActionable {
            locator: described,
            reason: "hidden".to_string(),
            timeout_ms,
        },
        Pending::Disabled => VitrineError::ElementNotActionable {
            locator: described,
            reason: "disabled".to_string(),
            timeout_ms,
        },
        Pending::StillPresent => VitrineError::Timeout {
            ms: timeout_ms,
            waiting_for: format!("{described} to detach"),
        },
        Pending::StillVisible => VitrineError::Timeout {
            ms: timeout_ms,
            waiting_for: format!("{described} to be hidden"),
        },
    }
}

/// Wait until `locator` satisfies `condition`.
///
/// Returns the matching element for presence conditions and `None` for
/// `Hidden`/`Detached`.
pub async fn wait_for_element(
    page: &dyn PageDriver,
    locator: &Locator,
    condition: WaitCondition,
    options: &WaitOptions,
) -> VitrineResult<Option<ElementSnapshot>> {
    let deadline = Instant::now() + options.timeout();
    let mut last_seen = None;
    loop {
        let Ok(queried) = tokio::time::timeout_at(deadline, page.query(locator.selector())).await
        else {
            return Err(match last_seen {
                Some(pending) => timeout_error(locator, pending, options.timeout_ms),
                None => VitrineError::Timeout {
                    ms: options.timeout_ms,
                    waiting_for: format!("{locator} to be {condition}"),
                },
            });
        };
        match evaluate(condition, options.strict, queried?) {
            Observation::Satisfied(found) => return Ok(found),
            Observation::Ambiguous(count) => {
                return Err(VitrineError::AmbiguousLocator {
                    locator: locator.to_string(),
                    count,
                })
            }
            Observation::Pending(pending) => {
                last_seen = Some(pending);
                let now = Instant::now();
                if now >= deadline {
                    return Err(timeout_error(locator, pending, options.timeout_ms));
                }
                tokio::time::sleep(options.poll_interval().min(deadline - now)).await;
            }
        }
    }
}

/// Poll `check` until it yields a value or the timeout elapses.
///
/// A check still running at the deadline is abandoned.
pub async fn poll_until<F, Fut, T>(
    options: &WaitOptions,
    waiting_for: &str,
    mut check: F,
) -> VitrineResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = VitrineResult<Option<T>>>,
{
    let deadline = Instant::now() + options.timeout();
    let timed_out = || VitrineError::Timeout {
        ms: options.timeout_ms,
        waiting_for: waiting_for.to_string(),
    };
    loop {
        let outcome = tokio::time::timeout_at(deadline, check())
            .await
            .map_err(|_| timed_out())?;
        if let Some(value) = outcome? {
            return Ok(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(timed_out());
        }
        tokio::time::sleep(options.poll_interval().min(deadline - now)).await;
    }
}
