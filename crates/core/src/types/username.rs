//! Username type with validated parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum accepted username length in bytes.
const MAX_LENGTH: usize = 64;

/// A validated login name.
///
/// Usernames are case-sensitive and restricted to ASCII letters, digits,
/// and the separators `.`, `_`, and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

/// Errors that can occur when parsing a username.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UsernameError {
    /// The input is empty or whitespace only.
    #[error("username cannot be empty")]
    Empty,
    /// The input exceeds the maximum length.
    #[error("username is too long (max {MAX_LENGTH} characters)")]
    TooLong,
    /// The input contains a character outside the allowed set.
    #[error("username contains invalid characters")]
    InvalidCharacter,
}

impl Username {
    /// Parse and validate a username from user input.
    ///
    /// Leading and trailing whitespace is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns a [`UsernameError`] if the trimmed input is empty, too long,
    /// or contains characters outside ASCII letters, digits, `.`, `_`, `-`.
    pub fn parse(input: &str) -> Result<Self, UsernameError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(UsernameError::Empty);
        }
        if trimmed.len() > MAX_LENGTH {
            return Err(UsernameError::TooLong);
        }
        let valid = trimmed
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));
        if !valid {
            return Err(UsernameError::InvalidCharacter);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Get the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Username {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Username {
    fn decode(
        value: sqlx::sqlite::SqliteValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Self::parse(&raw).map_err(Into::into)
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Username {
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
    fn test_parse_valid() {
        let username = Username::parse("admin").unwrap();
        assert_eq!(username.as_str(), "admin");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let username = Username::parse("  clerk1  ").unwrap();
        assert_eq!(username.as_str(), "clerk1");
    }

    #[test]
    fn test_parse_allows_separators() {
        assert!(Username::parse("shop.owner_2-a").is_ok());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(Username::parse(""), Err(UsernameError::Empty));
        assert_eq!(Username::parse("   "), Err(UsernameError::Empty));
    }

    #[test]
    fn test_parse_rejects_spaces_inside() {
        assert_eq!(
            Username::parse("two words"),
            Err(UsernameError::InvalidCharacter)
        );
    }

    #[test]
    fn test_parse_rejects_non_ascii() {
        assert_eq!(
            Username::parse("ädmin"),
            Err(UsernameError::InvalidCharacter)
        );
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let long = "a".repeat(65);
        assert_eq!(Username::parse(&long), Err(UsernameError::TooLong));
    }

    #[test]
    fn test_preserves_case() {
        let username = Username::parse("Admin").unwrap();
        assert_eq!(username.as_str(), "Admin");
    }
}
