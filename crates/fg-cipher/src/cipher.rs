//! The field cipher.
//!
//! `encrypt` derives a fresh per-record key from the master secret with
//! PBKDF2-HMAC-SHA256 over a random salt and seals the identifier with
//! AES-256-GCM under a random nonce. `decrypt` verifies the record checksum
//! before any key work, then authenticates and re-validates the output.

use crate::audit::{AuditLogEntry, AuditOperation};
use crate::identifier::IdentifierFormat;
use crate::kdf::derive_key;
use crate::key::KeyMaterialProvider;
use crate::record::{Algorithm, EncryptedRecord, HEADER_LEN, NONCE_LEN, SALT_LEN};
use crate::{CipherError, Result};
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, warn};

/// Associated data used when the caller supplies none.
pub const DEFAULT_AAD: &str = "fieldguard/national-id/v1";

/// Explicit cipher configuration.
#[derive(Clone)]
pub struct CipherConfig {
    /// When false, records are stored as plaintext with a checksum.
    pub encryption_enabled: bool,

    /// Secret appended to identifiers before hashing.
    pub pepper: Option<String>,

    /// Accepted identifier shape.
    pub identifier: IdentifierFormat,
}

impl CipherConfig {
    /// Enabled encryption with the given pepper and default identifier format.
    pub fn new(pepper: impl Into<String>) -> Self {
        Self {
            pepper: Some(pepper.into()),
            ..Self::default()
        }
    }

    /// Degraded mode: no encryption.
    pub fn disabled() -> Self {
        Self {
            encryption_enabled: false,
            ..Self::default()
        }
    }

    pub fn with_identifier(mut self, identifier: IdentifierFormat) -> Self {
        self.identifier = identifier;
        self
    }
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            encryption_enabled: true,
            pepper: None,
            identifier: IdentifierFormat::default(),
        }
    }
}

impl std::fmt::Debug for CipherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherConfig")
            .field("encryption_enabled", &self.encryption_enabled)
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .field("identifier", &self.identifier)
            .finish()
    }
}

/// Encrypts, decrypts and hashes regulated identifiers.
///
/// Stateless apart from its configuration and the shared key provider, so a
/// single instance can serve any number of threads.
#[derive(Clone)]
pub struct FieldCipher {
    config: CipherConfig,
    provider: Arc<dyn KeyMaterialProvider>,
}

impl FieldCipher {
    pub fn new(config: CipherConfig, provider: Arc<dyn KeyMaterialProvider>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    /// Encrypt a validated identifier.
    pub fn encrypt(&self, plaintext: &str, aad: Option<&str>) -> Result<EncryptedRecord> {
        self.config.identifier.validate(plaintext)?;

        if !self.config.encryption_enabled {
            warn!(
                algorithm = %Algorithm::None,
                "encryption disabled; storing identifier without encryption"
            );
            return Ok(EncryptedRecord::seal(
                plaintext.as_bytes().to_vec(),
                Algorithm::None,
            ));
        }

        let secret = self.provider.master_secret()?;

        let mut salt = [0u8; SALT_LEN];
        fill_random(&mut salt)?;
        let mut nonce = [0u8; NONCE_LEN];
        fill_random(&mut nonce)?;

        let key = derive_key(secret.as_bytes(), &salt)?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|_| CipherError::Encryption("derived key has wrong length".to_string()))?;

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = cipher
            .encrypt_in_place_detached(
                Nonce::from_slice(&nonce),
                aad.unwrap_or(DEFAULT_AAD).as_bytes(),
                &mut buffer,
            )
            .map_err(|_| CipherError::Encryption("AEAD seal failed".to_string()))?;

        let mut blob = Vec::with_capacity(HEADER_LEN + buffer.len());
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(tag.as_slice());
        blob.extend_from_slice(&buffer);

        debug!(algorithm = %Algorithm::Aes256Gcm, blob_len = blob.len(), "identifier encrypted");
        Ok(EncryptedRecord::seal(blob, Algorithm::Aes256Gcm))
    }

    /// Decrypt a record and re-validate the identifier.
    pub fn decrypt(&self, record: &EncryptedRecord, aad: Option<&str>) -> Result<String> {
        record.verify_checksum()?;

        let bytes = match record.algorithm {
            Algorithm::None => {
                if self.config.encryption_enabled {
                    warn!("refusing unencrypted record while encryption is enabled");
                    return Err(CipherError::Decryption);
                }
                warn!(algorithm = %Algorithm::None, "reading unencrypted record");
                record.ciphertext_blob.clone()
            }
            Algorithm::Aes256Gcm => self.open(record, aad)?,
        };

        let plaintext = String::from_utf8(bytes).map_err(|_| {
            CipherError::Validation("decrypted identifier is not valid UTF-8".to_string())
        })?;
        self.config.identifier.validate(&plaintext)?;

        debug!(algorithm = %record.algorithm, "identifier decrypted");
        Ok(plaintext)
    }

    fn open(&self, record: &EncryptedRecord, aad: Option<&str>) -> Result<Vec<u8>> {
        let parts = record.parts()?;
        let secret = self.provider.master_secret()?;
        let key = derive_key(secret.as_bytes(), parts.salt)?;
        let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CipherError::Decryption)?;

        let mut buffer = parts.ciphertext.to_vec();
        cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(parts.nonce),
                aad.unwrap_or(DEFAULT_AAD).as_bytes(),
                &mut buffer,
                Tag::from_slice(parts.tag),
            )
            .map_err(|_| CipherError::Decryption)?;
        Ok(buffer)
    }

    /// Deterministic peppered hash for equality lookups.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        self.config.identifier.validate(plaintext)?;
        let pepper = self
            .config
            .pepper
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| CipherError::Configuration("hash pepper is not configured".to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(plaintext.as_bytes());
        hasher.update(b":");
        hasher.update(pepper.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }

    /// Build an audit entry. Pure; delivery is the caller's job.
    pub fn audit_entry(
        &self,
        operation: AuditOperation,
        actor_id: &str,
        success: bool,
    ) -> AuditLogEntry {
        AuditLogEntry::new(operation, actor_id, success)
    }

    /// [`encrypt`](Self::encrypt) plus the matching audit entry.
    pub fn encrypt_audited(
        &self,
        plaintext: &str,
        aad: Option<&str>,
        actor_id: &str,
    ) -> (Result<EncryptedRecord>, AuditLogEntry) {
        let result = self.encrypt(plaintext, aad);
        let entry = self.audit_for(AuditOperation::Encrypt, actor_id, &result);
        (result, entry)
    }

    /// [`decrypt`](Self::decrypt) plus the matching audit entry.
    pub fn decrypt_audited(
        &self,
        record: &EncryptedRecord,
        aad: Option<&str>,
        actor_id: &str,
    ) -> (Result<String>, AuditLogEntry) {
        let result = self.decrypt(record, aad);
        let entry = self.audit_for(AuditOperation::Decrypt, actor_id, &result);
        (result, entry)
    }

    /// [`hash`](Self::hash) plus the matching audit entry.
    pub fn hash_audited(&self, plaintext: &str, actor_id: &str) -> (Result<String>, AuditLogEntry) {
        let result = self.hash(plaintext);
        let entry = self.audit_for(AuditOperation::Hash, actor_id, &result);
        (result, entry)
    }

    fn audit_for<T>(
        &self,
        operation: AuditOperation,
        actor_id: &str,
        result: &Result<T>,
    ) -> AuditLogEntry {
        match result {
            Ok(_) => self.audit_entry(operation, actor_id, true),
            Err(e) => {
                debug!(%operation, error_kind = e.kind(), "cipher operation failed");
                self.audit_entry(operation, actor_id, false)
                    .with_error_kind(e.kind())
            }
        }
    }
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn fill_random(buf: &mut [u8]) -> Result<()> {
    getrandom::getrandom(buf)
        .map_err(|e| CipherError::Encryption(format!("randomness source failed: {}", e)))
}
