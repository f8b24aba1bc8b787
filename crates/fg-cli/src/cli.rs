//! Command-line surface.

use crate::logging::{LogFormat, LogLevel};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// fieldguard - redact log context and protect regulated identifiers
#[derive(Parser, Debug)]
#[command(name = "fieldguard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Path to fieldguard.json (skips discovery; must exist)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Associated data bound into encrypted records
    #[arg(long, global = true)]
    pub aad: Option<String>,

    /// Actor recorded in audit entries
    #[arg(long, global = true, env = "FIELDGUARD_ACTOR")]
    pub actor: Option<String>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl GlobalOpts {
    /// Level requested on the command line, if any.
    pub fn cli_log_level(&self) -> Option<LogLevel> {
        if self.log_level.is_some() {
            return self.log_level;
        }
        if self.quiet {
            return Some(LogLevel::Error);
        }
        match self.verbose {
            0 => None,
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }

    /// Actor for audit entries: flag, then `$USER`, then "unknown".
    pub fn actor_id(&self) -> String {
        self.actor
            .clone()
            .filter(|a| !a.is_empty())
            .or_else(|| std::env::var("USER").ok().filter(|u| !u.is_empty()))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Redact sensitive fields and content from JSON, JSON lines or text
    Sanitize(SanitizeArgs),

    /// Encrypt an identifier into a JSON record
    Encrypt(IdentifierArgs),

    /// Decrypt a JSON record back into its identifier
    Decrypt(DecryptArgs),

    /// Peppered SHA-256 digest of an identifier, for equality lookups
    Hash(IdentifierArgs),

    /// Create a key file
    Keygen(KeygenArgs),

    /// Validate configuration, key material and pepper
    Check,
}

#[derive(Args, Debug)]
pub struct SanitizeArgs {
    /// Input file (stdin when omitted or "-")
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct IdentifierArgs {
    /// The identifier, or "-" to read it from stdin
    pub identifier: String,
}

#[derive(Args, Debug)]
pub struct DecryptArgs {
    /// Record file, or "-" for stdin
    #[arg(long, default_value = "-")]
    pub record: String,
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Key file to write
    #[arg(long)]
    pub out: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}
