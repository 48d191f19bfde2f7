//! Subcommand handlers
//!
//! Each handler returns `Ok(true)` when the command succeeded, `Ok(false)`
//! when it ran but the outcome is a failure, and `Err` when it could not run.

pub mod check;
pub mod deploy;

use std::path::Path;

use anyhow::{Context, Result};
use rdeploy::manifest::{load_with_warnings, with_env_overrides, Manifest, ManifestWarning};
use rdeploy::ui::primitives::icon::Icon;
use rdeploy::ui::terminal::detect_stderr;

/// Load the manifest, apply environment overrides and surface warnings
pub fn load_manifest(path: &Path, command: &str, json: bool) -> Result<Manifest> {
    let (manifest, warnings) = load_with_warnings(path)?;
    print_warnings(&warnings, command, json);
    let manifest = with_env_overrides(manifest, env_var)
        .with_context(|| format!("applying environment overrides to {}", path.display()))?;
    Ok(manifest)
}

pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn print_warnings(warnings: &[ManifestWarning], command: &str, json: bool) {
    if json {
        for warning in warnings {
            println!(
                "{}",
                serde_json::json!({
                    "event": "warning",
                    "command": command,
                    "key": warning.key,
                    "file": warning.file.display().to_string(),
                    "line": warning.line,
                    "suggestion": warning.suggestion,
                })
            );
        }
        return;
    }

    let caps = detect_stderr();
    for warning in warnings {
        eprintln!(
            "{} {}",
            Icon::Warning.colored(caps.supports_color, caps.supports_unicode),
            warning
        );
    }
}

/// Print a fatal error in the active output mode
pub fn report_error(err: &anyhow::Error, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "event": "error",
                "message": format!("{:#}", err),
            })
        );
        return;
    }
    let caps = detect_stderr();
    eprintln!(
        "{} Error: {:#}",
        Icon::Error.colored(caps.supports_color, caps.supports_unicode),
        err
    );
}
