//! Per-invocation state: loaded config, compiled policy, actor and sinks.

use crate::audit::open_sink;
use crate::cli::GlobalOpts;
use crate::error::{CliError, CliResult};
use fg_cipher::{AuditLogEntry, FieldCipher};
use fg_config::{load_config, ResolvedConfig};
use fg_redact::RedactionEngine;
use tracing::debug;

pub struct Runtime {
    pub run_id: String,
    pub resolved: ResolvedConfig,
    pub engine: RedactionEngine,
    pub actor: String,
    pub aad: Option<String>,
}

impl Runtime {
    /// Load and validate configuration for an operational command.
    ///
    /// A config that disables encryption without `allow_degraded` is refused
    /// here, before any identifier is read.
    pub fn load(global: &GlobalOpts, run_id: &str) -> CliResult<Self> {
        let resolved = load_config(global.config.as_deref())?;
        resolved.config.check_degraded_mode()?;
        let engine = resolved.config.redaction_engine()?;

        let snapshot = resolved.snapshot();
        debug!(
            run_id,
            source = %resolved.source,
            config_hash = snapshot.short_id(),
            encryption_enabled = resolved.config.encryption.enabled,
            "configuration loaded"
        );

        Ok(Self {
            run_id: run_id.to_string(),
            resolved,
            engine,
            actor: global.actor_id(),
            aad: global.aad.clone(),
        })
    }

    pub fn aad(&self) -> Option<&str> {
        self.aad.as_deref()
    }

    /// Build the cipher with the configured key provider.
    pub fn cipher(&self) -> CliResult<FieldCipher> {
        let provider = self.resolved.key_provider()?;
        Ok(FieldCipher::new(self.resolved.config.cipher_config(), provider))
    }

    /// Deliver one audit entry.
    pub fn deliver(&self, entry: &AuditLogEntry) -> CliResult<()> {
        let mut sink = open_sink(self.resolved.config.audit_log.as_deref(), &self.engine)
            .map_err(CliError::Audit)?;
        sink.record(entry).map_err(CliError::Audit)
    }
}
