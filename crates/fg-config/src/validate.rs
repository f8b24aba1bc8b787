//! Configuration validation errors and semantic validation.

use crate::config::FieldguardConfig;
use fg_redact::RedactionEngine;
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Largest identifier length a config may request.
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate a loaded configuration semantically.
pub fn validate_config(config: &FieldguardConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    let ident = &config.identifier;
    if ident.min_length == 0 {
        return Err(ValidationError::InvalidValue {
            field: "identifier.min_length".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }
    if ident.max_length > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::InvalidValue {
            field: "identifier.max_length".to_string(),
            message: format!(
                "Must be at most {}, got {}",
                MAX_IDENTIFIER_LENGTH, ident.max_length
            ),
        });
    }
    if ident.min_length > ident.max_length {
        return Err(ValidationError::SemanticError(format!(
            "identifier.min_length ({}) exceeds identifier.max_length ({})",
            ident.min_length, ident.max_length
        )));
    }

    // The value itself never appears in the message.
    if let Some(pepper) = &config.encryption.pepper {
        if pepper.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "encryption.pepper".to_string(),
                message: "Must not be empty when set".to_string(),
            });
        }
    }

    RedactionEngine::new(config.redaction.clone()).map_err(|e| ValidationError::InvalidValue {
        field: "redaction.content_patterns".to_string(),
        message: e.to_string(),
    })?;

    Ok(())
}
