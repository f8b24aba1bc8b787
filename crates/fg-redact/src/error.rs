//! Error types for the redaction engine.
//!
//! Only policy loading and compilation can fail. Sanitizing a value never
//! returns an error.

use thiserror::Error;

/// Result type for redaction operations.
pub type Result<T> = std::result::Result<T, RedactionError>;

/// Errors that can occur while loading or compiling a redaction policy.
#[derive(Error, Debug)]
pub enum RedactionError {
    /// The policy is structurally invalid.
    #[error("policy error: {0}")]
    PolicyError(String),

    /// A content pattern failed to compile.
    #[error("pattern '{name}' failed to compile: {message}")]
    PatternError { name: String, message: String },

    /// I/O error during policy file operations.
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}
