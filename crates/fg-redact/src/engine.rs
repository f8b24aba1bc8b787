//! Main redaction engine.
//!
//! The RedactionEngine is a compiled [`RedactionPolicy`]: key fragments are
//! normalized and content patterns are compiled once, so sanitizing a value
//! is a pure walk that cannot fail.

use crate::mask::mask_structured;
use crate::patterns::CompiledPattern;
use crate::policy::{normalize_fragments, normalize_key};
use crate::{
    FieldAction, RedactionPolicy, Result, SanitizableValue, MAX_DEPTH, MAX_DEPTH_MARKER,
    REDACTED_MARKER, UNSERIALIZABLE_MARKER,
};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Map;

static DEFAULT_ENGINE: Lazy<RedactionEngine> = Lazy::new(RedactionEngine::default);

/// Upper bound on content-pattern sweeps over a single string.
const MAX_SCAN_PASSES: usize = 4;

/// Counters collected while sanitizing a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RedactionStats {
    /// Values replaced because their key matched a blocked fragment.
    pub blocked: usize,
    /// Values masked because their key matched a masked fragment.
    pub masked: usize,
    /// Content-pattern matches replaced inside strings.
    pub pattern_hits: usize,
    /// Subtrees cut off by the depth guard.
    pub depth_truncations: usize,
}

impl RedactionStats {
    /// Returns whether any rule fired.
    pub fn was_modified(&self) -> bool {
        self.blocked + self.masked + self.pattern_hits + self.depth_truncations > 0
    }
}

/// A sanitized value together with what happened to it.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizeOutcome {
    /// The sanitized copy.
    pub value: SanitizableValue,
    /// Rule counters.
    pub stats: RedactionStats,
}

/// The main redaction engine.
#[derive(Debug, Clone)]
pub struct RedactionEngine {
    /// The source policy.
    policy: RedactionPolicy,

    /// Normalized blocked fragments.
    blocked: Vec<String>,

    /// Normalized masked fragments.
    masked: Vec<String>,

    /// Compiled content patterns, in policy order.
    patterns: Vec<CompiledPattern>,
}

impl RedactionEngine {
    /// Compile a policy into an engine.
    ///
    /// Fails only if a content pattern does not compile.
    pub fn new(policy: RedactionPolicy) -> Result<Self> {
        let blocked = normalize_fragments(&policy.blocked_fields);
        let masked = normalize_fragments(&policy.masked_fields);
        let patterns = policy
            .content_patterns
            .iter()
            .map(CompiledPattern::from_pattern)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            policy,
            blocked,
            masked,
            patterns,
        })
    }

    /// A process-wide engine built from the default policy.
    ///
    /// Useful before configuration has been loaded.
    pub fn shared_default() -> &'static RedactionEngine {
        &DEFAULT_ENGINE
    }

    /// Get a reference to the policy.
    pub fn policy(&self) -> &RedactionPolicy {
        &self.policy
    }

    /// Get the current policy version.
    pub fn policy_version(&self) -> &str {
        &self.policy.schema_version
    }

    /// Names of the compiled content patterns, in evaluation order.
    pub fn pattern_names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }

    /// Decide the action for a key.
    pub fn action_for(&self, key: &str) -> FieldAction {
        let key = normalize_key(key);
        if self.blocked.iter().any(|f| key.contains(f.as_str())) {
            FieldAction::Block
        } else if self.masked.iter().any(|f| key.contains(f.as_str())) {
            FieldAction::Mask
        } else {
            FieldAction::Scan
        }
    }

    /// Return a sanitized copy of `value`.
    ///
    /// The result has the same shape as the input except where a rule fired.
    /// The input is never mutated.
    pub fn sanitize(&self, value: &SanitizableValue) -> SanitizableValue {
        self.sanitize_at(value, 0)
    }

    /// Sanitize a value that sits at `depth` inside a larger structure.
    pub fn sanitize_at(&self, value: &SanitizableValue, depth: usize) -> SanitizableValue {
        let mut stats = RedactionStats::default();
        self.walk(value, depth, &mut stats)
    }

    /// Sanitize and report which rules fired.
    pub fn sanitize_with_report(&self, value: &SanitizableValue) -> SanitizeOutcome {
        let mut stats = RedactionStats::default();
        let value = self.walk(value, 0, &mut stats);
        SanitizeOutcome { value, stats }
    }

    /// Serialize any value and sanitize the result.
    ///
    /// A value that cannot be represented becomes [`UNSERIALIZABLE_MARKER`]
    /// rather than failing the surrounding log call.
    pub fn sanitize_serializable<T: Serialize + ?Sized>(&self, value: &T) -> SanitizableValue {
        match serde_json::to_value(value) {
            Ok(v) => self.sanitize(&v),
            Err(_) => SanitizableValue::String(UNSERIALIZABLE_MARKER.to_string()),
        }
    }

    /// Scan free text (a log message) with the content patterns.
    pub fn sanitize_str(&self, text: &str) -> String {
        let mut stats = RedactionStats::default();
        self.scan_text(text, &mut stats)
    }

    fn walk(
        &self,
        value: &SanitizableValue,
        depth: usize,
        stats: &mut RedactionStats,
    ) -> SanitizableValue {
        if depth > MAX_DEPTH {
            stats.depth_truncations += 1;
            return SanitizableValue::String(MAX_DEPTH_MARKER.to_string());
        }

        match value {
            SanitizableValue::Null | SanitizableValue::Bool(_) | SanitizableValue::Number(_) => {
                value.clone()
            }
            SanitizableValue::String(s) => SanitizableValue::String(self.scan_text(s, stats)),
            SanitizableValue::Array(items) => SanitizableValue::Array(
                items
                    .iter()
                    .map(|item| self.walk(item, depth + 1, stats))
                    .collect(),
            ),
            SanitizableValue::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, child) in map {
                    let sanitized = match self.action_for(key) {
                        FieldAction::Block => {
                            stats.blocked += 1;
                            SanitizableValue::String(REDACTED_MARKER.to_string())
                        }
                        FieldAction::Mask => {
                            stats.masked += 1;
                            mask_structured(child)
                        }
                        FieldAction::Scan => self.walk(child, depth + 1, stats),
                    };
                    out.insert(key.clone(), sanitized);
                }
                SanitizableValue::Object(out)
            }
        }
    }

    /// Sweep the content patterns over `text` until a sweep replaces nothing.
    ///
    /// A replacement can open a word boundary at its edge (a digit run glued
    /// to an email domain), so one sweep is not always a fixed point.
    fn scan_text(&self, text: &str, stats: &mut RedactionStats) -> String {
        let mut current = text.to_string();
        for _ in 0..MAX_SCAN_PASSES {
            let before = stats.pattern_hits;
            current = self.sweep(current, stats);
            if stats.pattern_hits == before {
                break;
            }
        }
        current
    }

    fn sweep(&self, mut current: String, stats: &mut RedactionStats) -> String {
        for pattern in &self.patterns {
            if !pattern.regex.is_match(&current) {
                continue;
            }
            let mut hits = 0;
            current = pattern
                .regex
                .replace_all(&current, |_: &regex::Captures<'_>| {
                    hits += 1;
                    REDACTED_MARKER
                })
                .into_owned();
            stats.pattern_hits += hits;
        }
        current
    }
}

impl Default for RedactionEngine {
    fn default() -> Self {
        Self::new(RedactionPolicy::default()).expect("built-in redaction policy compiles")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContentPattern;
    use serde_json::json;

    fn engine() -> RedactionEngine {
        RedactionEngine::new(RedactionPolicy::default()).unwrap()
    }

    #[test]
    fn test_blocked_field_replaced() {
        let out = engine().sanitize(&json!({"password": "Secr3t!"}));
        assert_eq!(out, json!({"password": "[REDACTED]"}));
    }

    #[test]
    fn test_blocked_field_not_recursed() {
        let out = engine().sanitize(&json!({"credentials_token": {"inner": {"a": 1}}}));
        assert_eq!(out, json!({"credentials_token": "[REDACTED]"}));
    }

    #[test]
    fn test_masked_field() {
        let out = engine().sanitize(&json!({"email": "a@b.com", "phone": "12"}));
        assert_eq!(out, json!({"email": "a@***om", "phone": "[REDACTED]"}));
    }

    #[test]
    fn test_masked_number_becomes_string() {
        let out = engine().sanitize(&json!({"customer_id": 9876543}));
        assert_eq!(out, json!({"customer_id": "98***43"}));
    }

    #[test]
    fn test_masked_null_stays_null() {
        let out = engine().sanitize(&json!({"email": null}));
        assert_eq!(out, json!({"email": null}));
    }

    #[test]
    fn test_content_patterns_in_strings() {
        let out = engine().sanitize(&json!({
            "message": "paid with 4111 1111 1111 1111 by jane@bank.com",
            "note": "acct 12345678901 ok"
        }));
        assert_eq!(out["message"], "paid with [REDACTED] by [REDACTED]");
        assert_eq!(out["note"], "acct [REDACTED] ok");
    }

    #[test]
    fn test_array_elements_scanned() {
        let out = engine().sanitize(&json!(["fine", "Bearer abc123", 42, null, true]));
        assert_eq!(out, json!(["fine", "[REDACTED]", 42, null, true]));
    }

    #[test]
    fn test_scalars_pass_through() {
        let e = engine();
        assert_eq!(e.sanitize(&json!(12)), json!(12));
        assert_eq!(e.sanitize(&json!(false)), json!(false));
        assert_eq!(e.sanitize(&json!(null)), json!(null));
        assert_eq!(e.sanitize(&json!("hello")), json!("hello"));
    }

    #[test]
    fn test_input_not_mutated() {
        let input = json!({"password": "x", "list": ["token=abc"]});
        let snapshot = input.clone();
        let _ = engine().sanitize(&input);
        assert_eq!(input, snapshot);
    }

    #[test]
    fn test_depth_guard() {
        let mut value = json!("leaf");
        for _ in 0..15 {
            value = json!({ "child": value });
        }
        let out = engine().sanitize(&value);

        let mut cursor = &out;
        let mut levels = 0;
        while let Some(child) = cursor.get("child") {
            cursor = child;
            levels += 1;
        }
        assert_eq!(cursor, &json!("[MAX_DEPTH_REACHED]"));
        assert_eq!(levels, MAX_DEPTH + 1);
    }

    #[test]
    fn test_leaf_at_max_depth_is_rendered() {
        let mut value = json!("leaf");
        for _ in 0..MAX_DEPTH {
            value = json!({ "child": value });
        }
        let out = engine().sanitize(&value);
        let stats = engine().sanitize_with_report(&value).stats;

        let mut cursor = &out;
        while let Some(child) = cursor.get("child") {
            cursor = child;
        }
        assert_eq!(cursor, &json!("leaf"));
        assert_eq!(stats.depth_truncations, 0);
    }

    #[test]
    fn test_sanitize_at_depth_beyond_max() {
        let out = engine().sanitize_at(&json!({"a": 1}), MAX_DEPTH + 1);
        assert_eq!(out, json!("[MAX_DEPTH_REACHED]"));
    }

    #[test]
    fn test_report_counts() {
        let outcome = engine().sanitize_with_report(&json!({
            "password": "x",
            "email": "someone@example.com",
            "note": "token=abc and 1234567890123"
        }));
        assert_eq!(outcome.stats.blocked, 1);
        assert_eq!(outcome.stats.masked, 1);
        assert_eq!(outcome.stats.pattern_hits, 2);
        assert!(outcome.stats.was_modified());
    }

    #[test]
    fn test_match_exposed_by_earlier_replacement() {
        let e = engine();
        let once = e.sanitize(&json!("a@b.co1234567890"));
        assert_eq!(once, json!("[REDACTED][REDACTED]"));
        assert_eq!(e.sanitize(&once), once);
    }

    #[test]
    fn test_report_unmodified() {
        let outcome = engine().sanitize_with_report(&json!({"status": "ok"}));
        assert!(!outcome.stats.was_modified());
    }

    #[test]
    fn test_sanitize_str() {
        let e = engine();
        assert_eq!(
            e.sanitize_str("login with password=hunter2 from a@b.io"),
            "login with [REDACTED] from [REDACTED]"
        );
    }

    #[test]
    fn test_sanitize_serializable() {
        #[derive(Serialize)]
        struct Ctx<'a> {
            user_id: &'a str,
            pin: u32,
        }
        let out = engine().sanitize_serializable(&Ctx {
            user_id: "u-123456",
            pin: 1234,
        });
        assert_eq!(out, json!({"user_id": "u-****56", "pin": "[REDACTED]"}));
    }

    #[test]
    fn test_unserializable_becomes_marker() {
        use std::collections::HashMap;
        let mut bad: HashMap<(u8, u8), u8> = HashMap::new();
        bad.insert((1, 2), 3);
        let out = engine().sanitize_serializable(&bad);
        assert_eq!(out, json!("[UNSERIALIZABLE]"));
    }

    #[test]
    fn test_invalid_custom_pattern_rejected() {
        let policy = RedactionPolicy::default().with_content_pattern(ContentPattern::new("bad", "["));
        assert!(RedactionEngine::new(policy).is_err());
    }

    #[test]
    fn test_custom_pattern_only_policy() {
        let policy = RedactionPolicy::empty()
            .with_content_pattern(ContentPattern::new("otp", r"\botp-\d{6}\b"));
        let e = RedactionEngine::new(policy).unwrap();
        assert_eq!(e.sanitize(&json!("code otp-123456")), json!("code [REDACTED]"));
        assert_eq!(e.pattern_names().collect::<Vec<_>>(), vec!["otp"]);
    }

    #[test]
    fn test_shared_default_matches_default_policy() {
        let shared = RedactionEngine::shared_default();
        assert_eq!(shared.policy(), &RedactionPolicy::default());
    }
}
