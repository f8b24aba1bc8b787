//! Partial masking for identifiers that are useful to see but not in full.

use crate::{is_marker, SanitizableValue, REDACTED_MARKER};

/// Mask a value, keeping only its outer characters.
///
/// Length is counted in Unicode scalar values and is preserved:
/// - up to 2 characters: replaced by the redaction marker
/// - 3 or 4 characters: first and last kept
/// - longer: first two and last two kept
///
/// Markers are returned unchanged so masking is idempotent.
pub fn mask_value(value: &str) -> String {
    if is_marker(value) {
        return value.to_string();
    }

    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    if len <= 2 {
        return REDACTED_MARKER.to_string();
    }

    let keep = if len <= 4 { 1 } else { 2 };
    let mut out = String::with_capacity(value.len());
    out.extend(&chars[..keep]);
    out.extend(std::iter::repeat('*').take(len - 2 * keep));
    out.extend(&chars[len - keep..]);
    out
}

/// Mask a structured value by its string form.
///
/// `null` has nothing to mask and stays `null`. Numbers and booleans use
/// their JSON text; containers use their compact JSON text.
pub(crate) fn mask_structured(value: &SanitizableValue) -> SanitizableValue {
    match value {
        SanitizableValue::Null => SanitizableValue::Null,
        SanitizableValue::String(s) => SanitizableValue::String(mask_value(s)),
        SanitizableValue::Bool(_)
        | SanitizableValue::Number(_)
        | SanitizableValue::Array(_)
        | SanitizableValue::Object(_) => SanitizableValue::String(mask_value(&value.to_string())),
    }
}
