//! Audit entries for cipher operations.
//!
//! The cipher builds entries; callers deliver them. An entry records who did
//! what and whether it worked, never the value involved.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Schema version for audit entries.
pub const AUDIT_SCHEMA_VERSION: &str = "1.0.0";

/// Operation recorded in an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOperation {
    Encrypt,
    Decrypt,
    Hash,
}

impl std::fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditOperation::Encrypt => "encrypt",
            AuditOperation::Decrypt => "decrypt",
            AuditOperation::Hash => "hash",
        };
        write!(f, "{}", s)
    }
}

/// A single audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// When the operation finished (RFC 3339, UTC).
    pub timestamp: DateTime<Utc>,

    /// Which operation ran.
    pub operation: AuditOperation,

    /// Caller-supplied identity of the actor.
    pub actor_id: String,

    /// Whether the operation succeeded.
    pub success: bool,

    /// Error kind for failed operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl AuditLogEntry {
    /// Create an entry stamped with the current time.
    pub fn new(operation: AuditOperation, actor_id: impl Into<String>, success: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            actor_id: actor_id.into(),
            success,
            error_kind: None,
        }
    }

    /// Attach the error kind of a failed operation.
    pub fn with_error_kind(mut self, kind: impl Into<String>) -> Self {
        self.error_kind = Some(kind.into());
        self
    }

    /// Timestamp in ISO-8601 with millisecond precision.
    pub fn timestamp_iso8601(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Serialize to a single JSON line.
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":"serialization_failed","operation":"{}"}}"#,
                self.operation
            )
        })
    }
}

/// Destination for audit entries.
pub trait AuditSink {
    /// Deliver one entry.
    fn record(&mut self, entry: &AuditLogEntry) -> std::io::Result<()>;
}

/// Writes entries as JSON lines.
#[derive(Debug)]
pub struct JsonlAuditSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonlAuditSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> AuditSink for JsonlAuditSink<W> {
    fn record(&mut self, entry: &AuditLogEntry) -> std::io::Result<()> {
        writeln!(self.writer, "{}", entry.to_jsonl())?;
        self.writer.flush()
    }
}

/// Collects entries in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    pub entries: Vec<AuditLogEntry>,
}

impl AuditSink for MemoryAuditSink {
    fn record(&mut self, entry: &AuditLogEntry) -> std::io::Result<()> {
        self.entries.push(entry.clone());
        Ok(())
    }
}
