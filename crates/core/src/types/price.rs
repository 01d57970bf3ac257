//! Exact price arithmetic in currency minor units.
//!
//! Prices arrive from the Shop Service as integers in the currency's minor
//! unit (satang, cents, ...). All cart math stays in integers; conversion to
//! [`Decimal`] only happens for display.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in the smallest currency unit.
///
/// Arithmetic saturates at the `i64` bounds rather than wrapping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Create a price from an amount in minor units.
    #[must_use]
    pub const fn from_minor(amount: i64) -> Self {
        Self(amount)
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(quantity)))
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Convert to a decimal in the currency's standard unit.
    ///
    /// ```rust
    /// # use stockcart_core::{CurrencyCode, Price};
    /// let price = Price::from_minor(12_350);
    /// assert_eq!(price.to_decimal(CurrencyCode::USD).to_string(), "123.50");
    /// assert_eq!(price.to_decimal(CurrencyCode::JPY).to_string(), "12350");
    /// ```
    #[must_use]
    pub fn to_decimal(self, currency: CurrencyCode) -> Decimal {
        Decimal::new(self.0, currency.minor_units())
    }

    /// Format for display (e.g., "฿99.00").
    #[must_use]
    pub fn display(self, currency: CurrencyCode) -> String {
        format!("{}{}", currency.symbol(), self.to_decimal(currency))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    THB,
    USD,
    EUR,
    GBP,
    JPY,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::THB => "฿",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::JPY => "¥",
        }
    }

    /// Number of minor-unit digits.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::JPY => 0,
            Self::THB | Self::USD | Self::EUR | Self::GBP => 2,
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Self::THB => "THB",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::JPY => "JPY",
        };
        f.pad(code)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "THB" => Ok(Self::THB),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "JPY" => Ok(Self::JPY),
            _ => Err(format!("unsupported currency: {s}")),
        }
    }
}
