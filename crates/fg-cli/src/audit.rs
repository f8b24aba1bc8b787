//! Audit delivery for CLI operations.
//!
//! Entries go to the configured JSONL file (append-only) or, when no file is
//! configured, to the tracing log under the `fieldguard::audit` target.

use crate::logging::sanitized_context;
use fg_cipher::{AuditLogEntry, AuditSink, JsonlAuditSink};
use fg_redact::RedactionEngine;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use tracing::info;

/// Emits audit entries as tracing events.
#[derive(Debug, Clone)]
pub struct TracingAuditSink {
    engine: RedactionEngine,
}

impl TracingAuditSink {
    pub fn new(engine: RedactionEngine) -> Self {
        Self { engine }
    }
}

impl AuditSink for TracingAuditSink {
    fn record(&mut self, entry: &AuditLogEntry) -> io::Result<()> {
        info!(
            target: "fieldguard::audit",
            operation = %entry.operation,
            success = entry.success,
            entry = %sanitized_context(&self.engine, entry),
            "audit"
        );
        Ok(())
    }
}

/// Open `path` for appending, creating it with mode 0600 on Unix.
pub fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

/// Choose the sink for this run.
pub fn open_sink(path: Option<&Path>, engine: &RedactionEngine) -> io::Result<Box<dyn AuditSink>> {
    match path {
        Some(path) => Ok(Box::new(JsonlAuditSink::new(open_append(path)?))),
        None => Ok(Box::new(TracingAuditSink::new(engine.clone()))),
    }
}
