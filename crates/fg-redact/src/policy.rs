//! Redaction policy configuration.
//!
//! A policy names the key fragments whose values are blocked or masked and
//! the content patterns scanned in every remaining string.

use crate::patterns::{default_patterns, ContentPattern};
use crate::FieldAction;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Schema version for the policy file.
pub const POLICY_SCHEMA_VERSION: &str = "1.0.0";

/// Key fragments whose values are replaced entirely.
pub const DEFAULT_BLOCKED_FIELDS: &[&str] = &[
    "password",
    "passwd",
    "pwd",
    "secret",
    "token",
    "jwt",
    "api_key",
    "authorization",
    "cookie",
    "credit",
    "card",
    "cvv",
    "cvc",
    "pin",
    "ssn",
    "national_id",
    "tax_id",
    "account_number",
    "bank_account",
    "iban",
    "routing_number",
    "private_key",
];

/// Key fragments whose values are partially masked.
pub const DEFAULT_MASKED_FIELDS: &[&str] = &[
    "email",
    "phone",
    "mobile",
    "user_id",
    "customer_id",
    "merchant_id",
];

/// Redaction policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionPolicy {
    /// Schema version.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Fragments matched against keys; matching values become the marker.
    #[serde(default = "default_blocked_fields")]
    pub blocked_fields: Vec<String>,

    /// Fragments matched against keys; matching values are masked.
    #[serde(default = "default_masked_fields")]
    pub masked_fields: Vec<String>,

    /// Patterns scanned in every string scalar, in order.
    #[serde(default = "default_patterns")]
    pub content_patterns: Vec<ContentPattern>,
}

fn default_schema_version() -> String {
    POLICY_SCHEMA_VERSION.to_string()
}

fn default_blocked_fields() -> Vec<String> {
    DEFAULT_BLOCKED_FIELDS.iter().map(|s| s.to_string()).collect()
}

fn default_masked_fields() -> Vec<String> {
    DEFAULT_MASKED_FIELDS.iter().map(|s| s.to_string()).collect()
}

/// Normalize a key or fragment for comparison.
///
/// Lower-cases and drops `_`, `-`, `.` and whitespace so `api_key`,
/// `apiKey` and `API-KEY` compare equal.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '_' | '-' | '.') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalize a fragment list, dropping fragments that normalize to nothing.
pub(crate) fn normalize_fragments(fragments: &[String]) -> Vec<String> {
    let mut out: Vec<String> = fragments
        .iter()
        .map(|f| normalize_key(f))
        .filter(|f| !f.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

impl RedactionPolicy {
    /// Create a new policy with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy with no rules at all (values pass through unchanged).
    pub fn empty() -> Self {
        Self {
            schema_version: POLICY_SCHEMA_VERSION.to_string(),
            blocked_fields: Vec::new(),
            masked_fields: Vec::new(),
            content_patterns: Vec::new(),
        }
    }

    /// Load policy from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let policy: RedactionPolicy = serde_json::from_str(&content)?;
        Ok(policy)
    }

    /// Save policy to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Add a blocked fragment.
    pub fn with_blocked_field(mut self, fragment: impl Into<String>) -> Self {
        self.blocked_fields.push(fragment.into());
        self
    }

    /// Add a masked fragment.
    pub fn with_masked_field(mut self, fragment: impl Into<String>) -> Self {
        self.masked_fields.push(fragment.into());
        self
    }

    /// Append a content pattern (evaluated after the existing ones).
    pub fn with_content_pattern(mut self, pattern: ContentPattern) -> Self {
        self.content_patterns.push(pattern);
        self
    }

    /// Decide the action for a key without compiling the policy.
    ///
    /// The compiled engine precomputes the normalized fragments; this is for
    /// one-off checks and diagnostics.
    pub fn action_for(&self, key: &str) -> FieldAction {
        let key = normalize_key(key);
        let hit = |fragments: &[String]| {
            fragments.iter().any(|f| {
                let f = normalize_key(f);
                !f.is_empty() && key.contains(&f)
            })
        };

        if hit(&self.blocked_fields) {
            FieldAction::Block
        } else if hit(&self.masked_fields) {
            FieldAction::Mask
        } else {
            FieldAction::Scan
        }
    }
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self {
            schema_version: POLICY_SCHEMA_VERSION.to_string(),
            blocked_fields: default_blocked_fields(),
            masked_fields: default_masked_fields(),
            content_patterns: default_patterns(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RedactionPolicy::default();
        assert_eq!(policy.schema_version, POLICY_SCHEMA_VERSION);
        assert!(policy.blocked_fields.contains(&"password".to_string()));
        assert!(policy.masked_fields.contains(&"email".to_string()));
        assert_eq!(policy.content_patterns.len(), 6);
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("API-Key"), "apikey");
        assert_eq!(normalize_key("user_id"), "userid");
        assert_eq!(normalize_key("userId"), "userid");
        assert_eq!(normalize_key("customer id"), "customerid");
        assert_eq!(normalize_key("x.auth.Token"), "xauthtoken");
    }

    #[test]
    fn test_action_for_key() {
        let policy = RedactionPolicy::default();
        assert_eq!(policy.action_for("password"), FieldAction::Block);
        assert_eq!(policy.action_for("DB_PASSWORD"), FieldAction::Block);
        assert_eq!(policy.action_for("apiKey"), FieldAction::Block);
        assert_eq!(policy.action_for("nationalId"), FieldAction::Block);
        assert_eq!(policy.action_for("customerEmail"), FieldAction::Mask);
        assert_eq!(policy.action_for("userId"), FieldAction::Mask);
        assert_eq!(policy.action_for("amount"), FieldAction::Scan);
    }

    #[test]
    fn test_blocked_wins_over_masked() {
        let policy = RedactionPolicy::empty()
            .with_blocked_field("secret")
            .with_masked_field("email");
        assert_eq!(policy.action_for("secret_email"), FieldAction::Block);
    }

    #[test]
    fn test_empty_fragments_ignored() {
        let policy = RedactionPolicy::empty().with_blocked_field("__");
        assert_eq!(policy.action_for("anything"), FieldAction::Scan);
        assert!(normalize_fragments(&policy.blocked_fields).is_empty());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed: RedactionPolicy = serde_json::from_str(r#"{"masked_fields": ["iban"]}"#).unwrap();
        assert_eq!(parsed.masked_fields, vec!["iban".to_string()]);
        assert_eq!(parsed.blocked_fields, default_blocked_fields());
        assert_eq!(parsed.content_patterns, default_patterns());
    }

    #[test]
    fn test_policy_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("redaction.json");

        let policy = RedactionPolicy::default().with_blocked_field("otp");
        policy.save(&path).unwrap();

        let loaded = RedactionPolicy::load(&path).unwrap();
        assert_eq!(loaded, policy);
    }
}
