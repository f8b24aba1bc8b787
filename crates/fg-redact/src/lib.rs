//! Redaction engine for structured log context.
//!
//! This crate scrubs arbitrary structured values (objects, arrays, scalars)
//! immediately before they are handed to a logging or audit sink, so that
//! credentials, account numbers and national-ID numbers never reach a
//! text transport.
//!
//! # Key Features
//!
//! - **Field-aware sanitization**: keys matching a blocked fragment are
//!   replaced wholesale, keys matching a masked fragment keep only their
//!   outer characters.
//! - **Content scanning**: every string scalar is scanned with an ordered list
//!   of patterns (card numbers, long digit runs, emails, bearer tokens,
//!   `secret=value` fragments). Patterns run on the `regex` crate's finite
//!   automata, so matching is linear in the input length.
//! - **Bounded recursion**: nesting deeper than [`MAX_DEPTH`] collapses into a
//!   sentinel string instead of exhausting the stack.
//! - **Never fails a log call**: sanitization is infallible once the engine is
//!   built; malformed input is passed through.
//!
//! # Example
//!
//! ```
//! use fg_redact::{RedactionEngine, RedactionPolicy};
//! use serde_json::json;
//!
//! let engine = RedactionEngine::new(RedactionPolicy::default()).unwrap();
//! let clean = engine.sanitize(&json!({
//!     "password": "Secr3t!",
//!     "email": "a@b.com",
//!     "nested": { "card": "4111111111111111" }
//! }));
//!
//! assert_eq!(clean["password"], "[REDACTED]");
//! assert_eq!(clean["email"], "a@***om");
//! assert_eq!(clean["nested"]["card"], "[REDACTED]");
//! ```

pub mod action;
pub mod engine;
pub mod error;
pub mod mask;
pub mod patterns;
pub mod policy;

pub use action::FieldAction;
pub use engine::{RedactionEngine, RedactionStats, SanitizeOutcome};
pub use error::{RedactionError, Result};
pub use mask::mask_value;
pub use patterns::ContentPattern;
pub use policy::RedactionPolicy;

/// Structured value accepted by the engine.
///
/// A recursive union of null, bool, number, string, array and string-keyed
/// object.
pub type SanitizableValue = serde_json::Value;

/// Replacement for blocked values and content-pattern matches.
pub const REDACTED_MARKER: &str = "[REDACTED]";

/// Replacement for any value nested deeper than [`MAX_DEPTH`].
pub const MAX_DEPTH_MARKER: &str = "[MAX_DEPTH_REACHED]";

/// Replacement for a value that could not be converted into a
/// [`SanitizableValue`].
pub const UNSERIALIZABLE_MARKER: &str = "[UNSERIALIZABLE]";

/// Deepest nesting level the engine renders. The root value is at depth 0,
/// so level 10 is the last one kept and anything at level 11 or below it
/// becomes [`MAX_DEPTH_MARKER`].
pub const MAX_DEPTH: usize = 10;

/// Returns true if `value` is one of the fixed markers the engine emits.
pub fn is_marker(value: &str) -> bool {
    value == REDACTED_MARKER || value == MAX_DEPTH_MARKER || value == UNSERIALIZABLE_MARKER
}
