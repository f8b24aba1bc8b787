//! Configuration snapshots for diagnostics.
//!
//! A snapshot records which configuration a run used without recording any
//! secret: the pepper shows up only as "configured" and where it came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resolve::{ConfigSource, ResolvedConfig};

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Path the config was loaded from.
    #[serde(default)]
    pub config_path: Option<String>,

    /// Source of the configuration.
    pub config_source: String,

    /// SHA-256 of the config file content, or of "none" for defaults.
    pub config_hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub encryption_enabled: bool,
    pub degraded_mode_allowed: bool,
    pub pepper_configured: bool,
    pub pepper_from_env: bool,
    pub identifier_min_length: usize,
    pub identifier_max_length: usize,
    pub redaction_policy_version: String,
    pub blocked_field_count: usize,
    pub masked_field_count: usize,
    pub content_patterns: Vec<String>,
    pub key_file_configured: bool,
    pub audit_log_configured: bool,
}

impl ConfigSnapshot {
    /// Create a snapshot from a resolved configuration.
    pub fn new(resolved: &ResolvedConfig) -> Self {
        let config = &resolved.config;
        let summary = ConfigSummary {
            encryption_enabled: config.encryption.enabled,
            degraded_mode_allowed: config.encryption.allow_degraded,
            pepper_configured: config
                .encryption
                .pepper
                .as_deref()
                .is_some_and(|p| !p.is_empty()),
            pepper_from_env: resolved.pepper_from_env,
            identifier_min_length: config.identifier.min_length,
            identifier_max_length: config.identifier.max_length,
            redaction_policy_version: config.redaction.schema_version.clone(),
            blocked_field_count: config.redaction.blocked_fields.len(),
            masked_field_count: config.redaction.masked_fields.len(),
            content_patterns: config
                .redaction
                .content_patterns
                .iter()
                .map(|p| p.name.clone())
                .collect(),
            key_file_configured: config.key_file.is_some(),
            audit_log_configured: config.audit_log.is_some(),
        };

        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            config_path: resolved.path.as_ref().map(|p| p.display().to_string()),
            config_source: resolved.source.to_string(),
            config_hash: resolved
                .content_hash
                .clone()
                .unwrap_or_else(|| hash_content("none")),
            summary,
        }
    }

    /// Returns whether the snapshot was built from defaults only.
    pub fn is_default(&self) -> bool {
        self.config_source == ConfigSource::BuiltinDefault.to_string()
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check if this snapshot matches another (same config file content).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.config_hash == other.config_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.config_hash[..12.min(self.config_hash.len())]
    }
}

/// Compute SHA-256 hash of content.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldguardConfig;

    fn resolved(config: FieldguardConfig, content: Option<&str>) -> ResolvedConfig {
        ResolvedConfig {
            config,
            path: None,
            source: ConfigSource::BuiltinDefault,
            content_hash: content.map(hash_content),
            pepper_from_env: false,
        }
    }

    #[test]
    fn test_hash_content() {
        let h = hash_content("test");
        assert_eq!(h.len(), 64);
        assert_eq!(h, hash_content("test"));
        assert_ne!(h, hash_content("other"));
    }

    #[test]
    fn test_defaults_snapshot() {
        let snap = resolved(FieldguardConfig::default(), None).snapshot();
        assert!(snap.is_default());
        assert_eq!(snap.config_hash, hash_content("none"));
        assert_eq!(snap.short_id().len(), 12);
        assert!(!snap.summary.pepper_configured);
        assert_eq!(snap.summary.content_patterns.len(), 6);
    }

    #[test]
    fn test_snapshot_never_contains_pepper() {
        let mut config = FieldguardConfig::default();
        config.encryption.pepper = Some("pepper-canary-value".to_string());
        let snap = resolved(config, Some("{}")).snapshot();

        assert!(snap.summary.pepper_configured);
        assert!(!snap.to_json().unwrap().contains("pepper-canary-value"));
    }

    #[test]
    fn test_matches_by_content() {
        let a = resolved(FieldguardConfig::default(), Some("{}")).snapshot();
        let b = resolved(FieldguardConfig::default(), Some("{}")).snapshot();
        let c = resolved(FieldguardConfig::default(), Some("{ }")).snapshot();
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }
}
