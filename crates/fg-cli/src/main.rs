//! fieldguard - sensitive-data protection CLI
//!
//! Thin caller around the library crates:
//! - `sanitize`: redact structured log context or free text
//! - `encrypt` / `decrypt`: authenticated field encryption of a regulated identifier
//! - `hash`: peppered digest for equality lookups
//! - `keygen`: create the master-secret key file
//! - `check`: validate configuration and environment
//!
//! stdout carries only the command payload. Failures print a generic message
//! and a stable exit code; detail goes to the (sanitized) log on stderr.

mod audit;
mod cli;
mod commands;
mod error;
mod exit_codes;
mod logging;
mod runtime;

use clap::Parser;
use cli::{Cli, Commands};
use error::{CliError, CliResult};
use exit_codes::ExitCode;
use fg_redact::RedactionEngine;
use logging::{generate_run_id, init_logging, LogConfig};
use tracing::{error, warn};

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(cli.global.cli_log_level(), cli.global.log_format);
    init_logging(&log_config);

    let run_id = generate_run_id();
    let exit_code = match run(&cli, &run_id) {
        Ok(code) => code,
        Err(err) => report_error(&err, &run_id),
    };

    std::process::exit(exit_code.as_i32());
}

fn run(cli: &Cli, run_id: &str) -> CliResult<ExitCode> {
    match &cli.command {
        Commands::Sanitize(args) => commands::run_sanitize(&cli.global, run_id, args),
        Commands::Encrypt(args) => commands::run_encrypt(&cli.global, run_id, args),
        Commands::Decrypt(args) => commands::run_decrypt(&cli.global, run_id, args),
        Commands::Hash(args) => commands::run_hash(&cli.global, run_id, args),
        Commands::Keygen(args) => commands::run_keygen(run_id, args),
        Commands::Check => commands::run_check(&cli.global, run_id),
    }
}

/// Log the sanitized detail, print the generic message, return the code.
fn report_error(err: &CliError, run_id: &str) -> ExitCode {
    let code = err.exit_code();
    let detail = RedactionEngine::shared_default().sanitize_str(&err.to_string());
    if code.is_internal_error() {
        error!(run_id, code = code.code_name(), kind = err.kind(), detail = %detail, "command failed");
    } else {
        warn!(run_id, code = code.code_name(), kind = err.kind(), detail = %detail, "command failed");
    }
    eprintln!("fieldguard: error: {} [{}]", code.description(), code.code_name());
    code
}
