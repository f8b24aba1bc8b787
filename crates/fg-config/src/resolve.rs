//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths →
//! system config → defaults.

use crate::config::FieldguardConfig;
use crate::snapshot::{hash_content, ConfigSnapshot};
use crate::validate::{validate_config, ValidationError, ValidationResult};
use fg_cipher::{
    CipherError, KeyFile, KeyMaterialProvider, MasterSecret, MissingKeyProvider, StaticKeyProvider,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/fieldguard/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "FIELDGUARD_CONFIG";
pub const ENV_CONFIG_DIR: &str = "FIELDGUARD_CONFIG_DIR";
pub const ENV_PEPPER: &str = "FIELDGUARD_PEPPER";
pub const ENV_MASTER_KEY: &str = "FIELDGUARD_MASTER_KEY";

/// Standard config file name.
pub const CONFIG_FILENAME: &str = "fieldguard.json";

/// Application name for XDG directories.
const APP_NAME: &str = "fieldguard";

/// Resolve the configuration file path.
///
/// Resolution order:
/// 1. Explicit CLI path (if it exists)
/// 2. `FIELDGUARD_CONFIG`
/// 3. `FIELDGUARD_CONFIG_DIR` + `fieldguard.json`
/// 4. XDG config directory (~/.config/fieldguard/)
/// 5. System config (/etc/fieldguard/)
/// 6. Built-in defaults (None)
pub fn resolve_config_path(cli_path: Option<&Path>) -> (Option<PathBuf>, ConfigSource) {
    if let Some(path) = cli_path {
        if path.exists() {
            return (Some(path.to_path_buf()), ConfigSource::CliArgument);
        }
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return (Some(path), ConfigSource::Environment);
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CONFIG_FILENAME);
        if path.exists() {
            return (Some(path), ConfigSource::Environment);
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return (Some(path), ConfigSource::XdgConfig);
        }
    }

    let system_path = system_config_dir().join(CONFIG_FILENAME);
    if system_path.exists() {
        return (Some(system_path), ConfigSource::SystemConfig);
    }

    (None, ConfigSource::BuiltinDefault)
}

/// Get the XDG config directory for fieldguard.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}

/// A loaded, validated configuration and where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: FieldguardConfig,
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
    /// SHA-256 of the file content, if a file was read.
    pub content_hash: Option<String>,
    /// Whether the pepper came from `FIELDGUARD_PEPPER`.
    pub pepper_from_env: bool,
}

/// Resolve, load, apply environment overrides and validate.
///
/// An explicit path that does not exist is an error rather than a silent
/// fall-through to defaults.
pub fn load_config(cli_path: Option<&Path>) -> ValidationResult<ResolvedConfig> {
    if let Some(path) = cli_path {
        if !path.exists() {
            return Err(ValidationError::IoError(format!(
                "{}: config file not found",
                path.display()
            )));
        }
    }

    let (path, source) = resolve_config_path(cli_path);
    let (mut config, content_hash) = match &path {
        Some(p) => {
            let content = std::fs::read_to_string(p)
                .map_err(|e| ValidationError::IoError(format!("{}: {}", p.display(), e)))?;
            (FieldguardConfig::from_json(&content)?, Some(hash_content(&content)))
        }
        None => (FieldguardConfig::default(), None),
    };

    let pepper_from_env = match std::env::var(ENV_PEPPER) {
        Ok(pepper) if !pepper.is_empty() => {
            config.encryption.pepper = Some(pepper);
            true
        }
        _ => false,
    };

    validate_config(&config)?;

    Ok(ResolvedConfig {
        config,
        path,
        source,
        content_hash,
        pepper_from_env,
    })
}

impl ResolvedConfig {
    /// Diagnostics snapshot (never includes the pepper).
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::new(self)
    }

    /// Build the key-material provider.
    ///
    /// Order: configured key file, then `FIELDGUARD_MASTER_KEY` (base64),
    /// then [`MissingKeyProvider`], which fails on first use.
    pub fn key_provider(&self) -> Result<Arc<dyn KeyMaterialProvider>, CipherError> {
        if let Some(path) = &self.config.key_file {
            return Ok(Arc::new(KeyFile::load(path)?));
        }
        if let Ok(encoded) = std::env::var(ENV_MASTER_KEY) {
            let secret = MasterSecret::from_base64(&encoded)?;
            return Ok(Arc::new(StaticKeyProvider::new(secret)));
        }
        Ok(Arc::new(MissingKeyProvider))
    }
}
