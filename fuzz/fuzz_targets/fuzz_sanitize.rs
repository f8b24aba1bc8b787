//! Fuzz target for the redaction engine.
//!
//! Arbitrary JSON documents and free text must sanitize without panicking,
//! keep their shape, and reach a fixed point after one pass.

#![no_main]

use fg_redact::{RedactionEngine, SanitizableValue};
use libfuzzer_sys::fuzz_target;

fn same_shape(a: &SanitizableValue, b: &SanitizableValue) -> bool {
    match (a, b) {
        (SanitizableValue::Array(x), SanitizableValue::Array(y)) => x.len() == y.len(),
        (SanitizableValue::Object(x), SanitizableValue::Object(y)) => {
            x.len() == y.len() && x.keys().zip(y.keys()).all(|(k1, k2)| k1 == k2)
        }
        // Blocked keys and depth truncation turn any value into a string.
        (_, SanitizableValue::String(_)) => true,
        (x, y) => std::mem::discriminant(x) == std::mem::discriminant(y),
    }
}

fuzz_target!(|data: &[u8]| {
    let engine = RedactionEngine::shared_default();

    if let Ok(text) = std::str::from_utf8(data) {
        let once = engine.sanitize_str(text);
        assert_eq!(engine.sanitize_str(&once), once);
    }

    if let Ok(value) = serde_json::from_slice::<SanitizableValue>(data) {
        let once = engine.sanitize(&value);
        assert!(same_shape(&value, &once));
        assert_eq!(engine.sanitize(&once), once);
    }
});
