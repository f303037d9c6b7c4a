//! Exact money amounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Amount in US cents
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Price(u32);

impl Price {
    /// Zero dollars
    pub const ZERO: Self = Self(0);

    /// From a number of cents
    #[must_use]
    pub const fn from_cents(cents: u32) -> Self {
        Self(cents)
    }

    /// Number of cents
    #[must_use]
    pub const fn cents(self) -> u32 {
        self.0
    }

    /// Percentage of this amount, rounded half up to the cent
    #[must_use]
    pub const fn percent(self, percent: u32) -> Self {
        Self((self.0 * percent + 50) / 100)
    }

    /// Parse the first `$D.CC` amount in `text`.
    ///
    /// Accepts `"$29.99"`, `"Item total: $29.99"` and `"Total: $32.39"`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (_, amount) = text.split_once('$')?;
        let amount: String = amount
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let (dollars, cents) = match amount.split_once('.') {
            Some((d, c)) if c.len() == 2 => (d, c),
            Some(_) => return None,
            None => (amount.as_str(), "00"),
        };
        let dollars: u32 = dollars.parse().ok()?;
        let cents: u32 = cents.parse().ok()?;
        dollars.checked_mul(100)?.checked_add(cents).map(Self)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
