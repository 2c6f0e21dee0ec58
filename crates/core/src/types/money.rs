//! Monetary amounts stored as integer cents.
//!
//! `SQLite` has no native decimal column type, so amounts are persisted as
//! `INTEGER` cents and only converted to [`rust_decimal::Decimal`] at the
//! presentation boundary. Arithmetic on cents is exact; the checked helpers
//! surface overflow instead of wrapping.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A monetary amount in cents.
///
/// Serializes as a two-decimal string (`"12.34"`) so JSON clients never see
/// floating point artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

/// Errors that can occur when parsing a monetary amount.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MoneyError {
    /// The input is not a valid decimal number.
    #[error("invalid amount")]
    Invalid,
    /// The amount has more than two decimal places.
    #[error("amount has more than two decimal places")]
    TooPrecise,
    /// The amount is negative.
    #[error("amount must not be negative")]
    Negative,
    /// The amount does not fit in 64-bit cents.
    #[error("amount out of range")]
    OutOfRange,
}

impl Money {
    /// Zero cents.
    pub const ZERO: Self = Self(0);

    /// Create an amount from a raw cent count.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Get the raw cent count.
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a non-negative decimal string such as `"45.00"` or `"5"`.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the input is not a decimal number, is
    /// negative, carries more than two decimal places, or overflows.
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let decimal = Decimal::from_str(input.trim()).map_err(|_| MoneyError::Invalid)?;
        Self::try_from_decimal(decimal)
    }

    /// Convert a [`Decimal`] into cents.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the value is negative, carries more than
    /// two decimal places, or overflows 64-bit cents.
    pub fn try_from_decimal(decimal: Decimal) -> Result<Self, MoneyError> {
        if decimal.is_sign_negative() && !decimal.is_zero() {
            return Err(MoneyError::Negative);
        }
        let scaled = decimal
            .checked_mul(Decimal::from(100))
            .ok_or(MoneyError::OutOfRange)?;
        if !scaled.is_integer() {
            return Err(MoneyError::TooPrecise);
        }
        scaled.to_i64().map(Self).ok_or(MoneyError::OutOfRange)
    }

    /// Convert to a [`Decimal`] with two decimal places.
    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Multiply by a unit count, returning `None` on overflow.
    #[must_use]
    pub const fn checked_mul(&self, count: i64) -> Option<Self> {
        match self.0.checked_mul(count) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Add another amount, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(&self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Subtract another amount, flooring at zero.
    ///
    /// Used for outstanding balances, which never go negative even when
    /// payments exceed the total.
    #[must_use]
    pub const fn saturating_sub_floor_zero(&self, other: Self) -> Self {
        let diff = self.0.saturating_sub(other.0);
        if diff < 0 { Self(0) } else { Self(diff) }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Money {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Money {
    fn decode(
        value: sqlx::sqlite::SqliteValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let cents = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(cents))
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}
