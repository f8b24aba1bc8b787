//! Per-field redaction actions.

use serde::{Deserialize, Serialize};

/// Action the engine takes for a value, decided from its key.
///
/// Rules are checked in declaration order and the first match wins:
/// a blocked key is never masked, and a masked key is never scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAction {
    /// Replace the whole value (including nested containers) with the marker.
    Block,
    /// Keep the outer characters of the value's string form.
    Mask,
    /// Recurse into the value and scan string scalars for sensitive content.
    Scan,
}

impl std::fmt::Display for FieldAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldAction::Block => "block",
            FieldAction::Mask => "mask",
            FieldAction::Scan => "scan",
        };
        write!(f, "{}", s)
    }
}
