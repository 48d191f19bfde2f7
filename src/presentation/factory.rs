//! Use Case Factory
//!
//! Creates the deploy use case with infrastructure dependencies wired up.
//! This is the dependency injection point for the binary.

use std::sync::Arc;

use crate::application::DeploymentOrchestrator;
use crate::domain::ports::DeployEventSink;
use crate::domain::value_objects::CancellationToken;
use crate::error::ManifestResult;
use crate::infrastructure::OpenSshConnector;
use crate::manifest::Manifest;

/// The orchestrator over the OpenSSH transport
pub type ConcreteOrchestrator = DeploymentOrchestrator<OpenSshConnector>;

/// Connector configured from `[connection]` and `[defaults]`
pub fn create_connector(
    manifest: &Manifest,
    cancel: CancellationToken,
) -> ManifestResult<OpenSshConnector> {
    let mut connector = OpenSshConnector::new().with_cancellation(cancel);
    if let Some(program) = &manifest.connection.ssh_program {
        connector = connector.with_program(program.clone());
    }
    if let Some(timeout) = manifest.transfer_timeout()? {
        connector = connector.with_transfer_timeout(timeout);
    }
    Ok(connector)
}

/// Create the deploy use case for a manifest
///
/// The same cancellation token reaches the connector and every stage, so a
/// Ctrl-C handler holding a clone can stop the run at any point.
pub fn create_orchestrator(
    manifest: &Manifest,
    cancel: CancellationToken,
    events: Arc<dyn DeployEventSink>,
) -> ManifestResult<ConcreteOrchestrator> {
    let connector = create_connector(manifest, cancel.clone())?;
    let options = manifest.deploy_options().with_cancellation(cancel);
    Ok(DeploymentOrchestrator::new(connector, options).with_events(events))
}
