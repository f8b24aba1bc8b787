//! Master-secret providers.
//!
//! The cipher never fetches key material itself; it asks a
//! [`KeyMaterialProvider`] on every encrypt or decrypt. Caching, retries and
//! remote key stores are the provider's concern.

use crate::{CipherError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Minimum accepted master-secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Schema version for the key file.
pub const KEY_FILE_SCHEMA_VERSION: &str = "1.0.0";

/// Algorithm label written into key-file entries.
pub const KEY_ALGORITHM: &str = "pbkdf2-hmac-sha256";

/// The long-term secret fed into the per-record KDF.
#[derive(Clone)]
pub struct MasterSecret(Vec<u8>);

impl MasterSecret {
    /// Wrap raw bytes, rejecting secrets shorter than [`MIN_SECRET_LEN`].
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < MIN_SECRET_LEN {
            return Err(CipherError::Configuration(format!(
                "master secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        Ok(Self(bytes))
    }

    /// Decode a base64 secret.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| CipherError::Configuration("master secret is not valid base64".into()))?;
        Self::new(bytes)
    }

    /// Generate a fresh random secret of [`MIN_SECRET_LEN`] bytes.
    pub fn generate() -> Result<Self> {
        let mut bytes = vec![0u8; MIN_SECRET_LEN];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| CipherError::Encryption(format!("randomness source failed: {}", e)))?;
        Ok(Self(bytes))
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MasterSecret(<{} bytes>)", self.0.len())
    }
}

/// Source of the master secret.
pub trait KeyMaterialProvider: Send + Sync {
    /// Return the current master secret.
    ///
    /// Absence is a [`CipherError::Configuration`], not a retry case.
    fn master_secret(&self) -> Result<MasterSecret>;
}

/// A secret held in memory.
#[derive(Debug, Clone)]
pub struct StaticKeyProvider {
    secret: MasterSecret,
}

impl StaticKeyProvider {
    pub fn new(secret: MasterSecret) -> Self {
        Self { secret }
    }

    /// Build from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Ok(Self::new(MasterSecret::new(bytes.into())?))
    }
}

impl KeyMaterialProvider for StaticKeyProvider {
    fn master_secret(&self) -> Result<MasterSecret> {
        Ok(self.secret.clone())
    }
}

/// Provider for deployments without key material.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingKeyProvider;

impl KeyMaterialProvider for MissingKeyProvider {
    fn master_secret(&self) -> Result<MasterSecret> {
        Err(CipherError::Configuration(
            "no master secret configured".to_string(),
        ))
    }
}

/// Lifecycle state of a key-file entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStatus {
    Active,
    Deprecated,
    Revoked,
}

/// Entry in the key file.
#[derive(Clone, Serialize, Deserialize)]
pub struct KeyEntry {
    /// When this key was created (RFC 3339).
    pub created_at: String,
    /// Algorithm the key is used with.
    pub algorithm: String,
    /// Base64-encoded key material.
    pub key_material: String,
    /// Key status.
    pub status: KeyStatus,
}

impl std::fmt::Debug for KeyEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyEntry")
            .field("created_at", &self.created_at)
            .field("algorithm", &self.algorithm)
            .field("key_material", &"<redacted>")
            .field("status", &self.status)
            .finish()
    }
}

impl KeyEntry {
    fn generate() -> Result<Self> {
        Ok(Self {
            created_at: chrono::Utc::now().to_rfc3339(),
            algorithm: KEY_ALGORITHM.to_string(),
            key_material: MasterSecret::generate()?.to_base64(),
            status: KeyStatus::Active,
        })
    }
}

/// JSON key file holding the active master secret.
///
/// Records do not name the key that sealed them, so the file never changes
/// its active key once written. Replacing it orphans every existing record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyFile {
    /// Schema version for the key file.
    pub schema_version: String,
    /// Map of key IDs to key entries.
    pub keys: HashMap<String, KeyEntry>,
    /// Currently active key ID.
    pub active_key_id: String,
}

impl KeyFile {
    /// Create a key file with one fresh key.
    pub fn generate() -> Result<Self> {
        let mut keys = HashMap::new();
        keys.insert("k1".to_string(), KeyEntry::generate()?);

        Ok(Self {
            schema_version: KEY_FILE_SCHEMA_VERSION.to_string(),
            keys,
            active_key_id: "k1".to_string(),
        })
    }

    /// Load a key file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CipherError::Configuration(format!("cannot read key file: {}", e.kind()))
        })?;
        serde_json::from_str(&content)
            .map_err(|_| CipherError::Configuration("key file is not valid JSON".to_string()))
    }

    /// Save the key file with restricted permissions.
    ///
    /// On Unix the file is created with mode 0600 so it is never readable by
    /// others, even briefly.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| CipherError::Configuration(format!("key file serialization: {}", e)))?;
        let io_err =
            |e: std::io::Error| CipherError::Configuration(format!("cannot write key file: {}", e.kind()));

        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;

            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path.as_ref())
                .map_err(io_err)?;
            file.write_all(content.as_bytes()).map_err(io_err)?;
            file.sync_all().map_err(io_err)?;
        }

        #[cfg(not(unix))]
        {
            std::fs::write(path.as_ref(), &content).map_err(io_err)?;
        }

        Ok(())
    }

    /// The active master secret.
    pub fn active_secret(&self) -> Result<MasterSecret> {
        let entry = self.keys.get(&self.active_key_id).ok_or_else(|| {
            CipherError::Configuration("active key not present in key file".to_string())
        })?;
        if entry.status != KeyStatus::Active {
            return Err(CipherError::Configuration(
                "active key is not in active status".to_string(),
            ));
        }
        MasterSecret::from_base64(&entry.key_material)
    }
}

impl KeyMaterialProvider for KeyFile {
    fn master_secret(&self) -> Result<MasterSecret> {
        self.active_secret()
    }
}
