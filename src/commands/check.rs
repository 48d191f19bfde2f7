use std::path::Path;

use anyhow::Result;
use rdeploy::domain::entities::DeploymentPlan;
use rdeploy::manifest::Manifest;
use rdeploy::ui::primitives::icon::Icon;
use rdeploy::ui::terminal::detect_stdout;
use rdeploy::ManifestError;

use super::{env_var, load_manifest};

pub fn cmd_check(manifest_path: &Path, json: bool, verbose: u8) -> Result<bool> {
    let manifest = load_manifest(manifest_path, "check", json)?;

    // A missing password is expected on machines that only validate
    let mut notes = Vec::new();
    let target = match manifest.connection_config(manifest_path, env_var) {
        Ok(config) => config.display_target(),
        Err(ManifestError::MissingSecret { name }) => {
            notes.push(format!("{} is not set; deploy will need it", name));
            display_target(&manifest)
        }
        Err(err) => return Err(err.into()),
    };
    let plan = manifest.plan(manifest_path)?;
    manifest.transfer_timeout()?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "event": "check",
                "command": "check",
                "valid": true,
                "target": target,
                "syncs": plan.syncs.len(),
                "ensure_dirs": plan.ensure_dirs.len(),
                "artifacts": plan.artifacts.len(),
                "removals": plan.removals.len(),
                "batches": plan.batches.iter().map(|b| serde_json::json!({
                    "name": b.name,
                    "commands": b.commands.len(),
                })).collect::<Vec<_>>(),
                "notes": notes,
            })
        );
        return Ok(true);
    }

    let caps = detect_stdout();
    let icon = |icon: Icon| icon.colored(caps.supports_color, caps.supports_unicode);
    println!("{} Manifest OK: {}", icon(Icon::Success), manifest_path.display());
    println!();
    print!("{}", render_plan(&target, &plan, verbose));
    for note in notes {
        println!("{} {}", icon(Icon::Warning), note);
    }
    Ok(true)
}

fn display_target(manifest: &Manifest) -> String {
    format!(
        "{}@{}:{}",
        manifest.connection.username, manifest.connection.host, manifest.connection.port
    )
}

fn render_plan(target: &str, plan: &DeploymentPlan, verbose: u8) -> String {
    let mut out = String::new();
    out.push_str(&format!("  Target: {}\n", target));
    for sync in &plan.syncs {
        out.push_str(&format!(
            "  Sync: {} -> {} (excluding {})\n",
            sync.local_root.display(),
            sync.remote_root,
            sync.exclusions.names().collect::<Vec<_>>().join(", ")
        ));
    }
    out.push_str(&format!("  Directories: {}\n", plan.ensure_dirs.len()));
    out.push_str(&format!("  Artifacts: {}\n", plan.artifacts.len()));
    out.push_str(&format!("  Removals: {}\n", plan.removals.len()));
    for batch in &plan.batches {
        out.push_str(&format!(
            "  Batch {}: {} command{}\n",
            batch.name,
            batch.commands.len(),
            if batch.commands.len() == 1 { "" } else { "s" }
        ));
        if verbose > 0 {
            for command in &batch.commands {
                out.push_str(&format!("    $ {}\n", command.effective_command()));
            }
        }
    }
    out
}
