//! Assertions for scenario bodies.
//!
//! Page objects only observe; scenarios decide. Every helper returns an
//! [`AssertionResult`] that turns into `AssertionFailed` through
//! [`AssertionResult::check`], so a body can write
//! `Assertion::equals(&1, &badge).check()?`.

use crate::result::{VitrineError, VitrineResult};
use std::fmt::Debug;

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Prefix the failure message with what was being checked
    #[must_use]
    pub fn context(mut self, what: &str) -> Self {
        if !self.passed {
            self.message = format!("{what}: {}", self.message);
        }
        self
    }

    /// Convert into a result
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` carrying the message if the assertion failed.
    pub fn check(self) -> VitrineResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(VitrineError::AssertionFailed {
                message: self.message,
            })
        }
    }
}

/// Assertion helpers for testing
#[derive(Debug, Clone, Copy)]
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    #[must_use]
    pub fn equals<T: PartialEq + Debug + ?Sized>(expected: &T, actual: &T) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {expected:?}, got {actual:?}"))
        }
    }

    /// Assert a string contains a substring
    #[must_use]
    pub fn contains(haystack: &str, needle: &str) -> AssertionResult {
        if haystack.contains(needle) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected '{haystack}' to contain '{needle}'"))
        }
    }

    /// Assert a condition is true
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message)
        }
    }

    /// Assert a condition is false
    #[must_use]
    pub fn is_false(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::fail(message)
        } else {
            AssertionResult::pass()
        }
    }

    /// Assert an Option is Some
    #[must_use]
    pub fn is_some<T>(opt: &Option<T>) -> AssertionResult {
        if opt.is_some() {
            AssertionResult::pass()
        } else {
            AssertionResult::fail("expected Some, got None")
        }
    }

    /// Assert an Option is None
    #[must_use]
    pub fn is_none<T: Debug>(opt: &Option<T>) -> AssertionResult {
        match opt {
            None => AssertionResult::pass(),
            Some(value) => AssertionResult::fail(format!("expected None, got Some({value:?})")),
        }
    }

    /// Assert a collection has the expected length
    #[must_use]
    pub fn has_length<T>(collection: &[T], expected: usize) -> AssertionResult {
        if collection.len() == expected {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected length {expected}, got {}",
                collection.len()
            ))
        }
    }

    /// Assert adjacent elements satisfy `in_order`
    #[must_use]
    pub fn is_sorted_by<T: Debug>(items: &[T], in_order: impl Fn(&T, &T) -> bool) -> AssertionResult {
        match items.windows(2).find(|pair| !in_order(&pair[0], &pair[1])) {
            None => AssertionResult::pass(),
            Some(pair) => AssertionResult::fail(format!(
                "{:?} is out of order before {:?}",
                pair[0], pair[1]
            )),
        }
    }

    /// Assert a result failed with the given error kind
    #[must_use]
    pub fn fails_with<T: Debug>(result: &VitrineResult<T>, kind: &str) -> AssertionResult {
        match result {
            Err(err) if err.kind() == kind => AssertionResult::pass(),
            Err(err) => AssertionResult::fail(format!("expected {kind}, got {}: {err}", err.kind())),
            Ok(value) => AssertionResult::fail(format!("expected {kind}, got Ok({value:?})")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod assertion_tests {
        use super::*;

        #[test]
        fn test_equals() {
            assert!(Assertion::equals(&1, &1).passed);
            let failed = Assertion::equals("a", "b");
            assert!(!failed.passed);
            assert_eq!(failed.message, "expected \"a\", got \"b\"");
        }

        #[test]
        fn test_sorted() {
            assert!(Assertion::is_sorted_by(&[1, 2, 2, 3], |a, b| a <= b).passed);
            let failed = Assertion::is_sorted_by(&[3, 1], |a, b| a <= b);
            assert_eq!(failed.message, "3 is out of order before 1");
        }

        #[test]
        fn test_fails_with() {
            let err: VitrineResult<()> = Err(VitrineError::ProductNotFound {
                name: "x".to_string(),
            });
            assert!(Assertion::fails_with(&err, "ProductNotFound").passed);
            assert!(!Assertion::fails_with(&err, "Timeout").passed);
            assert!(!Assertion::fails_with(&Ok(3), "Timeout").passed);
        }

        #[test]
        fn test_check_and_context() {
            assert!(Assertion::is_true(true, "unused").check().is_ok());
            let err = Assertion::has_length(&[1], 2)
                .context("cart rows")
                .check()
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "Assertion failed: cart rows: expected length 2, got 1"
            );
        }
    }
}
