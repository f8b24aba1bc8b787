//! The stored form of an encrypted identifier.
//!
//! Blob layout for `aes-256-gcm`:
//!
//! ```text
//! salt (32) || nonce (12) || tag (16) || ciphertext (variable)
//! ```
//!
//! For `none` the blob is the plaintext bytes. Any change to a component
//! length needs a new [`Algorithm`] tag.

use crate::{CipherError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// PBKDF2 salt length in bytes.
pub const SALT_LEN: usize = 32;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Fixed header preceding the ciphertext.
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Algorithm tag stored with every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// PBKDF2-HMAC-SHA256 key derivation with AES-256-GCM.
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    /// Degraded pass-through: the blob is the plaintext.
    #[serde(rename = "none")]
    None,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Aes256Gcm => "aes-256-gcm",
            Algorithm::None => "none",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of encrypting an identifier.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    /// Opaque blob, base64 when serialized.
    #[serde(with = "base64_bytes")]
    pub ciphertext_blob: Vec<u8>,

    /// How the blob was produced.
    pub algorithm: Algorithm,

    /// Creation time in milliseconds since the Unix epoch.
    pub created_at_epoch_millis: i64,

    /// Lower-case hex SHA-256 of `ciphertext_blob`.
    pub integrity_checksum: String,
}

impl EncryptedRecord {
    /// Build a record around `blob`, stamping the checksum and creation time.
    pub fn seal(blob: Vec<u8>, algorithm: Algorithm) -> Self {
        let integrity_checksum = checksum(&blob);
        Self {
            ciphertext_blob: blob,
            algorithm,
            created_at_epoch_millis: chrono::Utc::now().timestamp_millis(),
            integrity_checksum,
        }
    }

    /// Recompute the blob digest and compare it to the stored checksum.
    pub fn verify_checksum(&self) -> Result<()> {
        if checksum(&self.ciphertext_blob) == self.integrity_checksum {
            Ok(())
        } else {
            Err(CipherError::Integrity)
        }
    }

    /// Split an `aes-256-gcm` blob into its fixed-width parts.
    pub(crate) fn parts(&self) -> Result<BlobParts<'_>> {
        let blob = &self.ciphertext_blob;
        if blob.len() < HEADER_LEN {
            return Err(CipherError::Decryption);
        }
        let (salt, rest) = blob.split_at(SALT_LEN);
        let (nonce, rest) = rest.split_at(NONCE_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);
        Ok(BlobParts {
            salt,
            nonce,
            tag,
            ciphertext,
        })
    }

    /// Serialize to a compact JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| CipherError::Validation(format!("record serialization: {}", e)))
    }

    /// Parse a record from JSON.
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input)
            .map_err(|e| CipherError::Validation(format!("malformed record: {}", e)))
    }
}

// The blob may be a degraded-mode plaintext, so it never reaches Debug output.
impl std::fmt::Debug for EncryptedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedRecord")
            .field("ciphertext_blob", &format_args!("<{} bytes>", self.ciphertext_blob.len()))
            .field("algorithm", &self.algorithm)
            .field("created_at_epoch_millis", &self.created_at_epoch_millis)
            .field("integrity_checksum", &self.integrity_checksum)
            .finish()
    }
}

/// Borrowed view of an `aes-256-gcm` blob.
pub(crate) struct BlobParts<'a> {
    pub(crate) salt: &'a [u8],
    pub(crate) nonce: &'a [u8],
    pub(crate) tag: &'a [u8],
    pub(crate) ciphertext: &'a [u8],
}

/// Lower-case hex SHA-256 of `bytes`.
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_lowercase_sha256_hex() {
        // SHA-256("abc")
        assert_eq!(
            checksum(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_seal_sets_checksum() {
        let record = EncryptedRecord::seal(vec![1, 2, 3], Algorithm::None);
        assert_eq!(record.integrity_checksum, checksum(&[1, 2, 3]));
        assert!(record.verify_checksum().is_ok());
        assert!(record.created_at_epoch_millis > 0);
    }

    #[test]
    fn test_verify_detects_blob_change() {
        let mut record = EncryptedRecord::seal(vec![1, 2, 3], Algorithm::None);
        record.ciphertext_blob[0] ^= 0x01;
        assert!(matches!(record.verify_checksum(), Err(CipherError::Integrity)));
    }

    #[test]
    fn test_json_shape() {
        let record = EncryptedRecord::seal(b"hello".to_vec(), Algorithm::Aes256Gcm);
        let json: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(json["algorithm"], "aes-256-gcm");
        assert_eq!(json["ciphertext_blob"], "aGVsbG8=");
        assert_eq!(json["integrity_checksum"], record.integrity_checksum);

        let back = EncryptedRecord::from_json(&record.to_json().unwrap()).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_bad_base64_rejected() {
        let input = r#"{"ciphertext_blob":"@@@","algorithm":"none","created_at_epoch_millis":0,"integrity_checksum":""}"#;
        assert!(matches!(
            EncryptedRecord::from_json(input),
            Err(CipherError::Validation(_))
        ));
    }

    #[test]
    fn test_short_blob_is_decryption_error() {
        let record = EncryptedRecord::seal(vec![0u8; HEADER_LEN - 1], Algorithm::Aes256Gcm);
        assert!(matches!(record.parts(), Err(CipherError::Decryption)));
    }

    #[test]
    fn test_parts_layout() {
        let mut blob = vec![1u8; SALT_LEN];
        blob.extend(vec![2u8; NONCE_LEN]);
        blob.extend(vec![3u8; TAG_LEN]);
        blob.extend(b"ct");
        let record = EncryptedRecord::seal(blob, Algorithm::Aes256Gcm);
        let parts = record.parts().unwrap();
        assert!(parts.salt.iter().all(|b| *b == 1));
        assert!(parts.nonce.iter().all(|b| *b == 2));
        assert!(parts.tag.iter().all(|b| *b == 3));
        assert_eq!(parts.ciphertext, b"ct");
    }

    #[test]
    fn test_debug_hides_blob() {
        let record = EncryptedRecord::seal(b"1234567890".to_vec(), Algorithm::None);
        let debug = format!("{:?}", record);
        assert!(!debug.contains("1234567890"));
        assert!(debug.contains("<10 bytes>"));
    }
}
