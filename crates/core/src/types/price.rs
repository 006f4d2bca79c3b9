//! Type-safe price representation using decimal arithmetic.
//!
//! The storefront API serializes prices as decimal strings (`"19.99"`);
//! some endpoints emit bare numbers. Both forms deserialize into [`Price`].

use core::fmt;
use core::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The line total for `quantity` units at this price.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|p| p.0).sum())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_string_and_number() {
        let from_str: Price = serde_json::from_str("\"19.99\"").unwrap();
        assert_eq!(from_str, Price::from_cents(1999));

        let from_num: Price = serde_json::from_str("5").unwrap();
        assert_eq!(from_num, Price::from_cents(500));
    }

    #[test]
    fn test_display_two_places() {
        assert_eq!(Price::from_cents(1999).to_string(), "$19.99");
        assert_eq!(Price::from_cents(500).to_string(), "$5.00");
    }

    #[test]
    fn test_times_and_sum() {
        let unit = Price::from_cents(250);
        assert_eq!(unit.times(3), Price::from_cents(750));

        let total: Price = [unit, unit.times(2)].into_iter().sum();
        assert_eq!(total, Price::from_cents(750));
        assert_eq!(core::iter::empty::<Price>().sum::<Price>(), Price::ZERO);
    }
}
