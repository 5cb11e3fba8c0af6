//! Money value object stored as integer cents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

/// An amount of money in the shop currency, held as whole cents.
///
/// The commerce API sends prices as decimal strings ("20", "17.50"); those are
/// parsed once into cents so totals never accumulate float error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Parses a decimal price string as sent by the commerce API.
    ///
    /// Accepts `"20"`, `"17.5"`, `"17,50"` and surrounding whitespace. Empty or
    /// malformed strings yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().replace(',', ".");
        if normalized.is_empty() {
            return None;
        }
        let (whole, fraction) = match normalized.split_once('.') {
            Some((w, f)) => (w, f),
            None => (normalized.as_str(), ""),
        };
        let negative = whole.starts_with('-');
        let whole_digits = whole.trim_start_matches('-');
        if !whole_digits.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
            || (whole_digits.is_empty() && fraction.is_empty())
        {
            return None;
        }
        let units: i64 = if whole_digits.is_empty() {
            0
        } else {
            whole_digits.parse().ok()?
        };
        let mut fraction_cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().ok()? * 10,
            _ => fraction[..2].parse().ok()?,
        };
        // Round half up on the third decimal.
        if fraction.len() > 2 && fraction.as_bytes()[2] >= b'5' {
            fraction_cents += 1;
        }
        let cents = units.checked_mul(100)?.checked_add(fraction_cents)?;
        Some(Self(if negative { -cents } else { cents }))
    }

    /// Multiplies by a count, saturating instead of overflowing.
    pub fn times(&self, factor: i64) -> Self {
        Self(self.0.saturating_mul(factor))
    }

    /// Decimal representation without currency, as the commerce API expects.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "€{}", self.to_decimal_string())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, rhs: i64) -> Money {
        self.times(rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}
