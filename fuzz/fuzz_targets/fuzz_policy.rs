//! Fuzz target for redaction policy and fieldguard.json parsing.
//!
//! Untrusted policy files must either be rejected with an error or compile
//! into an engine that sanitizes without panicking.

#![no_main]

use fg_config::{validate_config, FieldguardConfig};
use fg_redact::{RedactionEngine, RedactionPolicy};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(policy) = serde_json::from_slice::<RedactionPolicy>(data) {
        if let Ok(engine) = RedactionEngine::new(policy) {
            let probe = serde_json::json!({"password": "x", "note": "a@b.com 4111111111111111"});
            let _ = engine.sanitize(&probe);
        }
    }

    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(config) = FieldguardConfig::from_json(text) {
            let _ = validate_config(&config);
        }
    }
});
