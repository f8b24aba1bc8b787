//! Field-level protection for a regulated national-identity number.
//!
//! This crate provides:
//! - Authenticated encryption (PBKDF2-HMAC-SHA256 key derivation, AES-256-GCM)
//! - Deterministic peppered SHA-256 hashing for equality lookups
//! - Checksummed, self-describing [`EncryptedRecord`]s
//! - Audit entries for every operation, handed back to the caller
//!
//! # Usage
//!
//! ```no_run
//! use fg_cipher::{CipherConfig, FieldCipher, StaticKeyProvider};
//! use std::sync::Arc;
//!
//! let provider = StaticKeyProvider::from_bytes(vec![7u8; 32]).unwrap();
//! let cipher = FieldCipher::new(CipherConfig::new("pepper"), Arc::new(provider));
//!
//! let record = cipher.encrypt("1234567890123", None).unwrap();
//! assert_eq!(cipher.decrypt(&record, None).unwrap(), "1234567890123");
//! ```
//!
//! The cipher performs no I/O: key material comes from a
//! [`KeyMaterialProvider`] and audit entries are returned, not written.

pub mod audit;
pub mod cipher;
pub mod error;
pub mod identifier;
mod kdf;
pub mod key;
pub mod record;

pub use audit::{AuditLogEntry, AuditOperation, AuditSink, JsonlAuditSink, MemoryAuditSink};
pub use cipher::{CipherConfig, FieldCipher, DEFAULT_AAD};
pub use error::{CipherError, Result};
pub use identifier::IdentifierFormat;
pub use kdf::KDF_ITERATIONS;
pub use key::{
    KeyEntry, KeyFile, KeyMaterialProvider, KeyStatus, MasterSecret, MissingKeyProvider,
    StaticKeyProvider,
};
pub use record::{checksum, Algorithm, EncryptedRecord};
