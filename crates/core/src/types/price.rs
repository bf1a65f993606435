//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as JSON numbers so persisted catalogs stay readable by
//! anything that wrote plain floats, but all arithmetic and comparison is done
//! on [`Decimal`].

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is zero or negative.
    #[error("price must be greater than zero")]
    NotPositive,
    /// The input could not be parsed as a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A product price in the shop's currency.
///
/// Deserialization accepts any decimal so stored data reloads verbatim;
/// use [`Price::try_new`] or [`Price::is_positive`] at the edges where input
/// must be validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Create a validated, strictly positive price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotPositive`] for zero or negative amounts.
    pub fn try_new(amount: Decimal) -> Result<Self, PriceError> {
        let price = Self(amount);
        if price.is_positive() {
            Ok(price)
        } else {
            Err(PriceError::NotPositive)
        }
    }

    /// Wrap an amount without validation.
    #[must_use]
    pub const fn new_unchecked(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|e| PriceError::Invalid(format!("{s}: {e}")))?;
        Self::try_new(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_rejects_zero_and_negative() {
        assert_eq!(Price::try_new(Decimal::ZERO), Err(PriceError::NotPositive));
        assert_eq!(
            Price::try_new(Decimal::new(-1, 2)),
            Err(PriceError::NotPositive)
        );
        assert!(Price::try_new(Decimal::new(1, 2)).is_ok());
    }

    #[test]
    fn test_serializes_as_json_number() {
        let price = Price::try_new(Decimal::new(250, 1)).unwrap();
        let json = serde_json::to_value(price).unwrap();
        assert!(json.is_number());
    }

    #[test]
    fn test_deserializes_from_json_number() {
        let price: Price = serde_json::from_str("2499.5").unwrap();
        assert_eq!(price.amount(), Decimal::new(24995, 1));
    }

    #[test]
    fn test_from_str_and_display() {
        let price: Price = "19.9".parse().unwrap();
        assert_eq!(price.to_string(), "19.90");
        assert!("abc".parse::<Price>().is_err());
        assert!("0".parse::<Price>().is_err());
    }
}
