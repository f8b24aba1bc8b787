//! Exit codes for the fieldguard CLI.
//!
//! Exit codes communicate operation outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0: Success
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors (bugs, should be reported)
//!
//! Argument parsing errors are reported by clap itself with exit code 2.

use fg_cipher::CipherError;
use fg_config::ValidationError;

/// Exit codes for fieldguard operations.
///
/// These codes are a stable contract for automation. Changes require
/// a major version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Clean = 0,

    // ========================================================================
    // User / Environment Errors (10-19)
    // ========================================================================
    /// Invalid input (unreadable record, refused overwrite)
    InputError = 10,

    /// Configuration missing, malformed or semantically invalid
    ConfigError = 11,

    /// Identifier does not have the regulated format
    InvalidIdentifier = 12,

    /// Key material or pepper missing or unusable
    KeyError = 13,

    /// Record checksum mismatch
    IntegrityError = 14,

    /// Record could not be decrypted
    DecryptionError = 15,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,

    /// Randomness source or AEAD seal failed
    EncryptionError = 22,

    /// Audit log could not be written
    AuditError = 23,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Check if this exit code is an internal error (codes 20-29).
    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InvalidIdentifier => "ERR_VALIDATION",
            ExitCode::KeyError => "ERR_KEY",
            ExitCode::IntegrityError => "ERR_INTEGRITY",
            ExitCode::DecryptionError => "ERR_DECRYPTION",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
            ExitCode::EncryptionError => "ERR_ENCRYPTION",
            ExitCode::AuditError => "ERR_AUDIT",
        }
    }

    /// Generic, user-facing description. Never carries input data.
    pub fn description(&self) -> &'static str {
        match self {
            ExitCode::Clean => "ok",
            ExitCode::InputError => "invalid input",
            ExitCode::ConfigError => "configuration is invalid",
            ExitCode::InvalidIdentifier => "identifier has an invalid format",
            ExitCode::KeyError => "key material or pepper is not available",
            ExitCode::IntegrityError => "record failed its integrity check",
            ExitCode::DecryptionError => "record could not be decrypted",
            ExitCode::InternalError => "internal error",
            ExitCode::IoError => "I/O error",
            ExitCode::EncryptionError => "encryption failed",
            ExitCode::AuditError => "audit log could not be written",
        }
    }
}

impl From<&CipherError> for ExitCode {
    fn from(err: &CipherError) -> Self {
        match err {
            CipherError::Validation(_) => ExitCode::InvalidIdentifier,
            CipherError::Integrity => ExitCode::IntegrityError,
            CipherError::Decryption => ExitCode::DecryptionError,
            CipherError::Configuration(_) => ExitCode::KeyError,
            CipherError::Encryption(_) => ExitCode::EncryptionError,
        }
    }
}

// An unreadable config file is a config problem, not an internal I/O fault.
impl From<&ValidationError> for ExitCode {
    fn from(_: &ValidationError) -> Self {
        ExitCode::ConfigError
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
