//! Error types for the field cipher.
//!
//! Display strings are safe to log: they never carry plaintext, key
//! material, key identifiers or which authentication check failed.

use thiserror::Error;

/// Result type for cipher operations.
pub type Result<T> = std::result::Result<T, CipherError>;

/// Errors that can occur during field encryption, decryption or hashing.
#[derive(Error, Debug)]
pub enum CipherError {
    /// The identifier does not have the regulated format.
    #[error("validation error: {0}")]
    Validation(String),

    /// The stored checksum does not match the blob.
    #[error("integrity check failed")]
    Integrity,

    /// The record could not be decrypted.
    #[error("decryption failed")]
    Decryption,

    /// Key material or pepper is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The randomness source or the AEAD seal failed.
    #[error("encryption failed: {0}")]
    Encryption(String),
}

impl CipherError {
    /// Stable numeric code for machine consumers.
    pub fn code(&self) -> u32 {
        match self {
            CipherError::Validation(_) => 20,
            CipherError::Integrity => 21,
            CipherError::Decryption => 22,
            CipherError::Configuration(_) => 23,
            CipherError::Encryption(_) => 24,
        }
    }

    /// Short kind tag, suitable for audit details and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CipherError::Validation(_) => "validation",
            CipherError::Integrity => "integrity",
            CipherError::Decryption => "decryption",
            CipherError::Configuration(_) => "configuration",
            CipherError::Encryption(_) => "encryption",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            CipherError::Validation("x".into()),
            CipherError::Integrity,
            CipherError::Decryption,
            CipherError::Configuration("x".into()),
            CipherError::Encryption("x".into()),
        ];
        let mut codes: Vec<u32> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_decryption_display_is_generic() {
        assert_eq!(CipherError::Decryption.to_string(), "decryption failed");
        assert_eq!(CipherError::Integrity.kind(), "integrity");
    }
}
