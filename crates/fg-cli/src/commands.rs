//! Command implementations.

use crate::cli::{DecryptArgs, GlobalOpts, IdentifierArgs, KeygenArgs, SanitizeArgs};
use crate::error::{CliError, CliResult};
use crate::exit_codes::ExitCode;
use crate::runtime::Runtime;
use fg_cipher::{AuditOperation, EncryptedRecord, KeyFile};
use fg_config::{load_config, CONFIG_SCHEMA_VERSION};
use fg_redact::{RedactionEngine, RedactionStats, SanitizableValue};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

// ============================================================================
// Input helpers
// ============================================================================

fn read_stdin() -> CliResult<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| CliError::io("reading stdin", e))?;
    Ok(buf)
}

fn read_path_or_stdin(path: Option<&Path>) -> CliResult<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .map_err(|e| CliError::io(format!("reading {}", p.display()), e)),
        _ => read_stdin(),
    }
}

/// The identifier argument, or stdin without its trailing newline for "-".
fn read_identifier(arg: &str) -> CliResult<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let input = read_stdin()?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn add_stats(total: &mut RedactionStats, stats: &RedactionStats) {
    total.blocked += stats.blocked;
    total.masked += stats.masked;
    total.pattern_hits += stats.pattern_hits;
    total.depth_truncations += stats.depth_truncations;
}

// ============================================================================
// sanitize
// ============================================================================

/// Sanitize a document.
///
/// A whole JSON object or array is sanitized structurally. Anything else is
/// handled line by line: lines holding a JSON object or array (JSON lines
/// logs) are sanitized structurally, other lines are scanned as free text.
/// Bare JSON scalars count as free text, so a lone account number is scanned.
pub fn sanitize_document(
    engine: &RedactionEngine,
    input: &str,
    pretty: bool,
) -> CliResult<(String, RedactionStats)> {
    if let Some(value) = parse_container(input) {
        let outcome = engine.sanitize_with_report(&value);
        let rendered = if pretty {
            serde_json::to_string_pretty(&outcome.value)?
        } else {
            serde_json::to_string(&outcome.value)?
        };
        return Ok((rendered, outcome.stats));
    }

    let mut total = RedactionStats::default();
    let mut lines = Vec::new();
    for line in input.lines() {
        match parse_container(line) {
            Some(value) => {
                let outcome = engine.sanitize_with_report(&value);
                add_stats(&mut total, &outcome.stats);
                lines.push(serde_json::to_string(&outcome.value)?);
            }
            None => lines.push(engine.sanitize_str(line)),
        }
    }
    Ok((lines.join("\n"), total))
}

/// Parse `text` as JSON only when it is an object or array.
fn parse_container(text: &str) -> Option<SanitizableValue> {
    let trimmed = text.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    serde_json::from_str::<SanitizableValue>(trimmed).ok()
}

pub fn run_sanitize(global: &GlobalOpts, run_id: &str, args: &SanitizeArgs) -> CliResult<ExitCode> {
    let rt = Runtime::load(global, run_id)?;
    let input = read_path_or_stdin(args.input.as_deref())?;
    let (output, stats) = sanitize_document(&rt.engine, &input, args.pretty)?;

    info!(
        run_id = %rt.run_id,
        blocked = stats.blocked,
        masked = stats.masked,
        pattern_hits = stats.pattern_hits,
        depth_truncations = stats.depth_truncations,
        "input sanitized"
    );
    println!("{}", output);
    Ok(ExitCode::Clean)
}

// ============================================================================
// encrypt / decrypt / hash
// ============================================================================

pub fn run_encrypt(global: &GlobalOpts, run_id: &str, args: &IdentifierArgs) -> CliResult<ExitCode> {
    let rt = Runtime::load(global, run_id)?;
    let identifier = read_identifier(&args.identifier)?;
    let cipher = rt.cipher()?;

    let (result, entry) = cipher.encrypt_audited(&identifier, rt.aad(), &rt.actor);
    rt.deliver(&entry)?;
    let record = result?;

    info!(run_id = %rt.run_id, algorithm = %record.algorithm, "identifier encrypted");
    println!("{}", record.to_json()?);
    Ok(ExitCode::Clean)
}

pub fn run_decrypt(global: &GlobalOpts, run_id: &str, args: &DecryptArgs) -> CliResult<ExitCode> {
    let rt = Runtime::load(global, run_id)?;
    let input = read_path_or_stdin(Some(Path::new(&args.record)))?;
    let cipher = rt.cipher()?;

    let record = match EncryptedRecord::from_json(input.trim()) {
        Ok(record) => record,
        Err(_) => {
            let entry = cipher
                .audit_entry(AuditOperation::Decrypt, &rt.actor, false)
                .with_error_kind("input");
            rt.deliver(&entry)?;
            return Err(CliError::Input("record is not a valid JSON record".to_string()));
        }
    };

    let (result, entry) = cipher.decrypt_audited(&record, rt.aad(), &rt.actor);
    rt.deliver(&entry)?;
    let plaintext = result?;

    info!(run_id = %rt.run_id, algorithm = %record.algorithm, "record decrypted");
    println!("{}", plaintext);
    Ok(ExitCode::Clean)
}

pub fn run_hash(global: &GlobalOpts, run_id: &str, args: &IdentifierArgs) -> CliResult<ExitCode> {
    let rt = Runtime::load(global, run_id)?;
    let identifier = read_identifier(&args.identifier)?;
    let cipher = rt.cipher()?;

    let (result, entry) = cipher.hash_audited(&identifier, &rt.actor);
    rt.deliver(&entry)?;
    let digest = result?;

    info!(run_id = %rt.run_id, "identifier hashed");
    println!("{}", digest);
    Ok(ExitCode::Clean)
}

// ============================================================================
// keygen
// ============================================================================

pub fn run_keygen(run_id: &str, args: &KeygenArgs) -> CliResult<ExitCode> {
    if args.out.exists() && !args.force {
        return Err(CliError::Input(
            "key file already exists; pass --force to overwrite".to_string(),
        ));
    }
    let key_file = KeyFile::generate()?;
    key_file.save(&args.out)?;

    info!(
        run_id,
        active_key_id = %key_file.active_key_id,
        overwritten = args.force,
        "key file written"
    );
    let summary = serde_json::json!({
        "path": args.out.display().to_string(),
        "active_key_id": key_file.active_key_id,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(ExitCode::Clean)
}

// ============================================================================
// check
// ============================================================================

fn check_result(check: &str, status: &str, note: impl Into<String>) -> serde_json::Value {
    serde_json::json!({
        "check": check,
        "status": status,
        "note": note.into(),
    })
}

/// Validate configuration and environment without touching any identifier.
///
/// Prints a JSON report; the exit code reflects the first failing check.
pub fn run_check(global: &GlobalOpts, run_id: &str) -> CliResult<ExitCode> {
    let mut results: Vec<serde_json::Value> = Vec::new();
    let mut exit_code = ExitCode::Clean;
    let mut snapshot = None;

    match load_config(global.config.as_deref()) {
        Err(e) => {
            exit_code = ExitCode::from(&e);
            let detail = RedactionEngine::shared_default().sanitize_str(&e.to_string());
            results.push(check_result("config", "error", detail));
        }
        Ok(resolved) => {
            let snap = resolved.snapshot();
            results.push(check_result(
                "config",
                "ok",
                format!("{} ({})", resolved.source, snap.short_id()),
            ));

            let config = &resolved.config;
            match config.check_degraded_mode() {
                Ok(()) if config.encryption.enabled => {
                    results.push(check_result("encryption", "ok", "aes-256-gcm"));
                }
                Ok(()) => {
                    results.push(check_result(
                        "encryption",
                        "warn",
                        "degraded mode: identifiers are stored without encryption",
                    ));
                }
                Err(e) => {
                    exit_code = ExitCode::ConfigError;
                    results.push(check_result("encryption", "error", e.to_string()));
                }
            }

            if config.encryption.enabled {
                match resolved.key_provider().and_then(|p| p.master_secret()) {
                    Ok(_) => results.push(check_result("key_material", "ok", "master secret available")),
                    Err(e) => {
                        if exit_code.is_success() {
                            exit_code = ExitCode::KeyError;
                        }
                        results.push(check_result("key_material", "error", e.kind()));
                    }
                }
            }

            if snap.summary.pepper_configured {
                let source = if resolved.pepper_from_env { "environment" } else { "config file" };
                results.push(check_result("pepper", "ok", format!("configured via {}", source)));
            } else {
                results.push(check_result("pepper", "warn", "not configured; hash will fail"));
            }

            match &config.audit_log {
                Some(path) => {
                    let parent_ok = path
                        .parent()
                        .map(|p| p.as_os_str().is_empty() || p.is_dir())
                        .unwrap_or(true);
                    if parent_ok {
                        results.push(check_result("audit_log", "ok", path.display().to_string()));
                    } else {
                        if exit_code.is_success() {
                            exit_code = ExitCode::ConfigError;
                        }
                        results.push(check_result(
                            "audit_log",
                            "error",
                            "parent directory does not exist",
                        ));
                    }
                }
                None => results.push(check_result("audit_log", "info", "entries go to the log")),
            }

            snapshot = Some(snap);
        }
    }

    let response = serde_json::json!({
        "schema_version": CONFIG_SCHEMA_VERSION,
        "run_id": run_id,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "status": if exit_code.is_success() { "ok" } else { "error" },
        "checks": results,
        "snapshot": snapshot,
    });
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !exit_code.is_success() {
        warn!(run_id, code = exit_code.code_name(), "check failed");
    }
    Ok(exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> &'static RedactionEngine {
        RedactionEngine::shared_default()
    }

    #[test]
    fn test_sanitize_whole_document() {
        let input = r#"{"password": "hunter2", "email": "a@b.com"}"#;
        let (out, stats) = sanitize_document(engine(), input, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, json!({"password": "[REDACTED]", "email": "a@***om"}));
        assert_eq!(stats.blocked, 1);
        assert_eq!(stats.masked, 1);
    }

    #[test]
    fn test_sanitize_json_lines() {
        let input = "{\"token\": \"abc\"}\n{\"note\": \"ok\"}\n";
        let (out, stats) = sanitize_document(engine(), input, false).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec![r#"{"token":"[REDACTED]"}"#, r#"{"note":"ok"}"#]);
        assert_eq!(stats.blocked, 1);
    }

    #[test]
    fn test_sanitize_free_text() {
        let input = "paid with 4111111111111111\nmail a@b.com\nnothing here";
        let (out, _) = sanitize_document(engine(), input, false).unwrap();
        assert!(!out.contains("4111111111111111"));
        assert!(!out.contains("a@b.com"));
        assert!(out.ends_with("nothing here"));
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn test_sanitize_mixed_lines() {
        let input = "{\"secret\": 1}\nplain {not json";
        let (out, _) = sanitize_document(engine(), input, false).unwrap();
        assert_eq!(out, "{\"secret\":\"[REDACTED]\"}\nplain {not json");
    }

    #[test]
    fn test_sanitize_bare_number_is_free_text() {
        let (out, _) = sanitize_document(engine(), "1234567890123\n", false).unwrap();
        assert!(!out.contains("1234567890123"));
        assert!(out.contains("[REDACTED]"));

        let (out, _) = sanitize_document(engine(), "12345678901234567890123\n", false).unwrap();
        assert!(!out.contains("12345678901234567890123"));
        assert!(!out.contains("e+"));
    }

    #[test]
    fn test_sanitize_bare_json_string_is_scanned() {
        let (out, _) = sanitize_document(engine(), "\"a@b.com\"", false).unwrap();
        assert!(!out.contains("a@b.com"));
    }

    #[test]
    fn test_sanitize_pretty() {
        let (out, _) = sanitize_document(engine(), r#"{"a": 1}"#, true).unwrap();
        assert!(out.contains('\n'));
    }

    #[test]
    fn test_add_stats() {
        let mut total = RedactionStats::default();
        let one = RedactionStats {
            blocked: 1,
            masked: 2,
            pattern_hits: 3,
            depth_truncations: 0,
        };
        add_stats(&mut total, &one);
        add_stats(&mut total, &one);
        assert_eq!(total.pattern_hits, 6);
        assert_eq!(total.masked, 4);
    }

    #[test]
    fn test_read_identifier_passthrough() {
        assert_eq!(read_identifier("1234567890").unwrap(), "1234567890");
    }
}
