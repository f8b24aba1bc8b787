//! fieldguard configuration loading and validation.
//!
//! This crate provides:
//! - The typed `fieldguard.json` schema
//! - Config resolution (CLI → env → XDG → /etc → defaults)
//! - Semantic validation
//! - Config snapshots for diagnostics
//!
//! The engines never read the environment; this crate is where
//! `FIELDGUARD_PEPPER` and `FIELDGUARD_MASTER_KEY` are consulted.

pub mod config;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use config::{EncryptionSettings, FieldguardConfig, IdentifierSettings};
pub use resolve::{load_config, resolve_config_path, ConfigSource, ResolvedConfig};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
