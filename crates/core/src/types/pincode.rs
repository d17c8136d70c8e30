//! Postal pincode type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Pincode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PincodeError {
    /// The input string is empty.
    #[error("pincode cannot be empty")]
    Empty,
    /// The input does not have the required number of characters.
    #[error("pincode must be exactly {expected} digits")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
    },
    /// The input contains something other than ASCII digits.
    #[error("pincode must contain only digits")]
    NonDigit,
}

/// A six-digit delivery pincode.
///
/// Validation happens locally so a malformed pincode never reaches the
/// marketplace API.
///
/// ## Examples
///
/// ```
/// use giftora_core::Pincode;
///
/// assert!(Pincode::parse("560001").is_ok());
/// assert!(Pincode::parse(" 110001 ").is_ok()); // surrounding whitespace is trimmed
///
/// assert!(Pincode::parse("").is_err());
/// assert!(Pincode::parse("5600").is_err());
/// assert!(Pincode::parse("56A001").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Pincode(String);

impl Pincode {
    /// Number of digits in a pincode.
    pub const LENGTH: usize = 6;

    /// Parse a `Pincode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, is not exactly six
    /// characters long, or contains non-digit characters.
    pub fn parse(s: &str) -> Result<Self, PincodeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PincodeError::Empty);
        }

        if s.chars().count() != Self::LENGTH {
            return Err(PincodeError::WrongLength {
                expected: Self::LENGTH,
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PincodeError::NonDigit);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the pincode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Pincode {
    type Err = PincodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Pincode {
    type Error = PincodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Pincode> for String {
    fn from(pincode: Pincode) -> Self {
        pincode.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Pincode::parse("560001").unwrap().as_str(), "560001");
        assert_eq!(Pincode::parse("  400050\n").unwrap().as_str(), "400050");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Pincode::parse("   "), Err(PincodeError::Empty));
    }

    #[test]
    fn test_parse_wrong_length() {
        assert_eq!(
            Pincode::parse("12345"),
            Err(PincodeError::WrongLength { expected: 6 })
        );
        assert_eq!(
            Pincode::parse("1234567"),
            Err(PincodeError::WrongLength { expected: 6 })
        );
    }

    #[test]
    fn test_parse_non_digit() {
        assert_eq!(Pincode::parse("12a456"), Err(PincodeError::NonDigit));
        // Six characters but multi-byte digits are still rejected
        assert_eq!(Pincode::parse("١٢٣٤٥٦"), Err(PincodeError::NonDigit));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Pincode = serde_json::from_str("\"682001\"").unwrap();
        assert_eq!(ok.to_string(), "682001");

        assert!(serde_json::from_str::<Pincode>("\"68200\"").is_err());
    }
}
