//! CLI error type.
//!
//! Display strings may carry paths and error detail; they go to the log
//! (after sanitization), never to stderr. Stderr only ever sees
//! [`ExitCode::description`].

use crate::exit_codes::ExitCode;
use fg_cipher::CipherError;
use fg_config::ValidationError;
use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config: {0}")]
    Config(#[from] ValidationError),

    #[error("cipher: {0} (code {code})", code = .0.code())]
    Cipher(#[from] CipherError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid input: {0}")]
    Input(String),

    #[error("audit log: {0}")]
    Audit(#[source] std::io::Error),

    #[error("output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        CliError::Io {
            context: context.into(),
            source,
        }
    }

    /// Stable exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Config(e) => ExitCode::from(e),
            CliError::Cipher(e) => ExitCode::from(e),
            CliError::Io { .. } => ExitCode::IoError,
            CliError::Input(_) => ExitCode::InputError,
            CliError::Audit(_) => ExitCode::AuditError,
            CliError::Output(_) => ExitCode::InternalError,
        }
    }

    /// Short kind tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::Config(_) => "config",
            CliError::Cipher(e) => e.kind(),
            CliError::Io { .. } => "io",
            CliError::Input(_) => "input",
            CliError::Audit(_) => "audit",
            CliError::Output(_) => "output",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::from(CipherError::Decryption).exit_code(),
            ExitCode::DecryptionError
        );
        assert_eq!(
            CliError::Input("x".into()).exit_code(),
            ExitCode::InputError
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(CliError::Audit(io).exit_code(), ExitCode::AuditError);
    }

    #[test]
    fn test_cipher_error_display_carries_code() {
        assert_eq!(
            CliError::from(CipherError::Integrity).to_string(),
            "cipher: integrity check failed (code 21)"
        );
    }

    #[test]
    fn test_kind_passes_through_cipher_kind() {
        assert_eq!(CliError::from(CipherError::Integrity).kind(), "integrity");
        assert_eq!(
            CliError::from(ValidationError::SemanticError("x".into())).kind(),
            "config"
        );
    }
}
