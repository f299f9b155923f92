//! Amount type representing a decimal number with a currency.
//!
//! Posting amounts are kept as exact decimals; the query engine converts them
//! to floating point only when they become result cells.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount is a quantity paired with a currency.
///
/// # Examples
///
/// ```
/// use wazbean_core::Amount;
/// use rust_decimal_macros::dec;
///
/// let amount = Amount::new(dec!(87.34), "USD");
/// assert_eq!(amount.number, dec!(87.34));
/// assert_eq!(amount.currency, "USD");
/// assert_eq!(amount.to_string(), "87.34 USD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    /// The decimal quantity
    pub number: Decimal,
    /// The currency code (e.g., "USD", "EUR")
    pub currency: String,
}

impl Amount {
    /// Create a new amount.
    #[must_use]
    pub fn new(number: Decimal, currency: impl Into<String>) -> Self {
        Self {
            number,
            currency: currency.into(),
        }
    }

    /// Check if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.number.is_zero()
    }

    /// The quantity as a float, as used in query results.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.number.to_f64().unwrap_or_default()
    }

    /// Render with exactly two decimal places, e.g. `1500.00 USD`.
    #[must_use]
    pub fn to_fixed_string(&self) -> String {
        let mut number = self.number.round_dp(2);
        number.rescale(2);
        format!("{number} {}", self.currency)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.currency)
    }
}
