//! Invoice number type with validated parsing.
//!
//! Invoice numbers follow the `INV-0001` pattern and double as PDF file
//! names on disk, so parsing is strict: anything outside the prefix plus
//! digits shape is rejected before it can reach the filesystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by all invoice numbers.
const PREFIX: &str = "INV-";

/// Upper bound on accepted input length, generous beyond any real sequence.
const MAX_LENGTH: usize = 32;

/// A validated invoice number such as `INV-0042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

/// Errors that can occur when parsing an invoice number.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvoiceNumberError {
    /// The input is empty.
    #[error("invoice number cannot be empty")]
    Empty,
    /// The input does not match the `INV-` prefix plus digits shape.
    #[error("invalid invoice number")]
    Malformed,
}

impl InvoiceNumber {
    /// Format a sequence number as an invoice number.
    ///
    /// Sequence numbers are zero-padded to four digits and grow naturally
    /// past `INV-9999`.
    #[must_use]
    pub fn from_seq(seq: i64) -> Self {
        Self(format!("{PREFIX}{seq:04}"))
    }

    /// Parse and validate an invoice number from untrusted input.
    ///
    /// # Errors
    ///
    /// Returns an [`InvoiceNumberError`] if the input is empty or does not
    /// consist of the `INV-` prefix followed only by ASCII digits.
    pub fn parse(input: &str) -> Result<Self, InvoiceNumberError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(InvoiceNumberError::Empty);
        }
        if trimmed.len() > MAX_LENGTH {
            return Err(InvoiceNumberError::Malformed);
        }
        let digits = trimmed
            .strip_prefix(PREFIX)
            .ok_or(InvoiceNumberError::Malformed)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvoiceNumberError::Malformed);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Get the invoice number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<InvoiceNumber> for String {
    fn from(number: InvoiceNumber) -> Self {
        number.0
    }
}

impl<'de> Deserialize<'de> for InvoiceNumber {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for InvoiceNumber {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for InvoiceNumber {
    fn decode(
        value: sqlx::sqlite::SqliteValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Self::parse(&raw).map_err(Into::into)
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for InvoiceNumber {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_seq_zero_pads() {
        assert_eq!(InvoiceNumber::from_seq(1).as_str(), "INV-0001");
        assert_eq!(InvoiceNumber::from_seq(42).as_str(), "INV-0042");
    }

    #[test]
    fn test_from_seq_grows_past_four_digits() {
        assert_eq!(InvoiceNumber::from_seq(12345).as_str(), "INV-12345");
    }

    #[test]
    fn test_parse_valid() {
        let number = InvoiceNumber::parse("INV-0007").unwrap();
        assert_eq!(number.as_str(), "INV-0007");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(InvoiceNumber::parse(""), Err(InvoiceNumberError::Empty));
        assert_eq!(InvoiceNumber::parse("   "), Err(InvoiceNumberError::Empty));
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        assert_eq!(
            InvoiceNumber::parse("0001"),
            Err(InvoiceNumberError::Malformed)
        );
    }

    #[test]
    fn test_parse_rejects_path_traversal() {
        assert_eq!(
            InvoiceNumber::parse("../../etc/passwd"),
            Err(InvoiceNumberError::Malformed)
        );
        assert_eq!(
            InvoiceNumber::parse("INV-00/1"),
            Err(InvoiceNumberError::Malformed)
        );
        assert_eq!(
            InvoiceNumber::parse("INV-0001.pdf"),
            Err(InvoiceNumberError::Malformed)
        );
    }

    #[test]
    fn test_parse_rejects_bare_prefix() {
        assert_eq!(
            InvoiceNumber::parse("INV-"),
            Err(InvoiceNumberError::Malformed)
        );
    }

    #[test]
    fn test_round_trip() {
        let number = InvoiceNumber::from_seq(99);
        let parsed = InvoiceNumber::parse(number.as_str()).unwrap();
        assert_eq!(parsed, number);
    }
}
