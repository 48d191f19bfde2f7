use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rdeploy::domain::ports::DeployEventSink;
use rdeploy::domain::value_objects::CancellationToken;
use rdeploy::infrastructure::{ConsoleEventSink, DeployLock, JsonEventSink};
use rdeploy::manifest::select_batches;
use rdeploy::presentation::{create_orchestrator, create_renderer, OutputFormat};
use rdeploy::ui::terminal::{detect_stderr, detect_stdout};

use super::{env_var, load_manifest};

pub fn cmd_deploy(
    manifest_path: &Path,
    only_commands: bool,
    batches: &[String],
    json: bool,
    verbose: u8,
) -> Result<bool> {
    let manifest = load_manifest(manifest_path, "deploy", json)?;
    let config = manifest.connection_config(manifest_path, env_var)?;

    let mut plan = manifest.plan(manifest_path)?;
    select_batches(&mut plan, batches)?;
    if only_commands {
        plan.syncs.clear();
        plan.ensure_dirs.clear();
        plan.artifacts.clear();
        plan.removals.clear();
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || cancel.cancel()).context("installing Ctrl-C handler")?;
    }

    let _lock = DeployLock::acquire(config.host(), config.port())?;

    let events: Arc<dyn DeployEventSink> = if json {
        Arc::new(JsonEventSink::stdout())
    } else {
        Arc::new(ConsoleEventSink::stderr(detect_stderr(), verbose))
    };
    let orchestrator = create_orchestrator(&manifest, cancel, events)?;
    let report = orchestrator.deploy_plan(&config, &plan);

    let format = if json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let caps = detect_stdout();
    let renderer = create_renderer(format, caps.supports_color, caps.supports_unicode, verbose);
    println!("{}", renderer.render(&report));

    Ok(report.success() && !report.has_failures())
}
