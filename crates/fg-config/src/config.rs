//! Typed fieldguard configuration file.

use crate::validate::{ValidationError, ValidationResult};
use fg_cipher::{CipherConfig, IdentifierFormat};
use fg_redact::{RedactionEngine, RedactionPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Encryption switch and hashing pepper.
#[derive(Clone, Serialize, Deserialize)]
pub struct EncryptionSettings {
    /// When false the cipher runs in the `none` pass-through mode.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Pepper for identifier hashing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pepper: Option<String>,

    /// Permit `enabled = false`. Without this a disabled config is refused
    /// at startup.
    #[serde(default)]
    pub allow_degraded: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EncryptionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            pepper: None,
            allow_degraded: false,
        }
    }
}

impl std::fmt::Debug for EncryptionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionSettings")
            .field("enabled", &self.enabled)
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .field("allow_degraded", &self.allow_degraded)
            .finish()
    }
}

/// Length bounds of the regulated identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierSettings {
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_min_length() -> usize {
    fg_cipher::identifier::DEFAULT_MIN_LEN
}

fn default_max_length() -> usize {
    fg_cipher::identifier::DEFAULT_MAX_LEN
}

impl Default for IdentifierSettings {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            max_length: default_max_length(),
        }
    }
}

/// The fieldguard configuration file (`fieldguard.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldguardConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub encryption: EncryptionSettings,

    #[serde(default)]
    pub identifier: IdentifierSettings,

    /// Redaction policy; the built-in policy when omitted.
    #[serde(default)]
    pub redaction: RedactionPolicy,

    /// JSON key file holding the master secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,

    /// Append-only JSONL audit log.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_log: Option<PathBuf>,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

impl Default for FieldguardConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            encryption: EncryptionSettings::default(),
            identifier: IdentifierSettings::default(),
            redaction: RedactionPolicy::default(),
            key_file: None,
            audit_log: None,
        }
    }
}

impl FieldguardConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> ValidationResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ValidationError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(content: &str) -> ValidationResult<Self> {
        serde_json::from_str(content).map_err(|e| ValidationError::ParseError(e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> ValidationResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ValidationError::ParseError(e.to_string()))
    }

    /// Cipher configuration derived from this file.
    pub fn cipher_config(&self) -> CipherConfig {
        CipherConfig {
            encryption_enabled: self.encryption.enabled,
            pepper: self.encryption.pepper.clone(),
            identifier: IdentifierFormat::new(
                self.identifier.min_length,
                self.identifier.max_length,
            ),
        }
    }

    /// Compile the redaction policy.
    pub fn redaction_engine(&self) -> ValidationResult<RedactionEngine> {
        RedactionEngine::new(self.redaction.clone()).map_err(|e| ValidationError::InvalidValue {
            field: "redaction.content_patterns".to_string(),
            message: e.to_string(),
        })
    }

    /// Refuse degraded mode unless explicitly allowed.
    pub fn check_degraded_mode(&self) -> ValidationResult<()> {
        if !self.encryption.enabled && !self.encryption.allow_degraded {
            return Err(ValidationError::SemanticError(
                "encryption.enabled is false but encryption.allow_degraded is not set".to_string(),
            ));
        }
        Ok(())
    }
}
