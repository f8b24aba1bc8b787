//! Format rules for the regulated national-identity number.

use crate::{CipherError, Result};
use serde::{Deserialize, Serialize};

/// Default minimum identifier length.
pub const DEFAULT_MIN_LEN: usize = 10;

/// Default maximum identifier length.
pub const DEFAULT_MAX_LEN: usize = 16;

/// Accepted shape of an identifier: ASCII digits only, length within bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierFormat {
    /// Minimum length, inclusive.
    pub min_len: usize,
    /// Maximum length, inclusive.
    pub max_len: usize,
}

impl IdentifierFormat {
    pub fn new(min_len: usize, max_len: usize) -> Self {
        Self { min_len, max_len }
    }

    /// Check `value` against the format.
    ///
    /// The error message names the rule, never the value.
    pub fn validate(&self, value: &str) -> Result<()> {
        let len = value.len();
        if len < self.min_len || len > self.max_len {
            return Err(CipherError::Validation(format!(
                "identifier must be {} to {} digits",
                self.min_len, self.max_len
            )));
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CipherError::Validation(
                "identifier must contain only ASCII digits".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns whether `value` matches the format.
    pub fn is_valid(&self, value: &str) -> bool {
        self.validate(value).is_ok()
    }
}

impl Default for IdentifierFormat {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_inclusive() {
        let f = IdentifierFormat::default();
        assert!(f.is_valid("1234567890"));
        assert!(f.is_valid("1234567890123456"));
        assert!(!f.is_valid("123456789"));
        assert!(!f.is_valid("12345678901234567"));
    }

    #[test]
    fn test_digits_only() {
        let f = IdentifierFormat::default();
        assert!(!f.is_valid("12345abcde"));
        assert!(!f.is_valid("1234 567890"));
        assert!(!f.is_valid("-123456789"));
        // non-ASCII digits are rejected
        assert!(!f.is_valid("١٢٣٤٥٦٧٨٩٠"));
        assert!(!f.is_valid(""));
    }

    #[test]
    fn test_error_does_not_echo_value() {
        let err = IdentifierFormat::default().validate("99999abcde").unwrap_err();
        assert!(!err.to_string().contains("99999"));
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_custom_bounds() {
        let f = IdentifierFormat::new(3, 4);
        assert!(f.is_valid("123"));
        assert!(f.is_valid("1234"));
        assert!(!f.is_valid("12345"));
    }
}
