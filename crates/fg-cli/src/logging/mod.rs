//! Structured logging for the fieldguard CLI.
//!
//! Provides dual-mode logging:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSON lines for pipelines
//!
//! # Design Notes
//!
//! - stdout is reserved for command payloads (records, digests, sanitized JSON)
//! - stderr receives all log output (human or JSONL)
//! - Structured context goes through the redaction engine before it is
//!   attached to an event; see [`sanitized_context`]

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use fg_redact::{RedactionEngine, SanitizableValue};
use serde::Serialize;
use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging subsystem.
///
/// Must be called once at startup before any logging occurs. RUST_LOG is
/// honoured unless the level was given on the command line.
pub fn init_logging(config: &LogConfig) {
    let filter = if config.level_from_cli {
        EnvFilter::new(config.directives())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directives()))
    };

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .init();
            }
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .init();
        }
    }
}

/// Generate a unique run ID for this invocation.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    // Shorten to first 12 hex chars for readability
    format!("run-{}", &uuid.simple().to_string()[..12])
}

/// Sanitize a context object and render it for a log field.
pub fn sanitized_context<T: Serialize + ?Sized>(engine: &RedactionEngine, context: &T) -> String {
    let value: SanitizableValue = engine.sanitize_serializable(context);
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_id_shape() {
        let id = generate_run_id();
        assert!(id.starts_with("run-"));
        assert_eq!(id.len(), 16);
        assert_ne!(id, generate_run_id());
    }

    #[test]
    fn test_sanitized_context_scrubs() {
        let engine = RedactionEngine::shared_default();
        let rendered = sanitized_context(
            engine,
            &json!({"token": "abc", "note": "card 4111111111111111"}),
        );
        assert!(!rendered.contains("abc"));
        assert!(!rendered.contains("4111111111111111"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
