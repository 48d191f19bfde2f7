//! rdeploy - single-host deployment orchestrator
//!
//! Mirrors local trees to a remote host, writes generated artifacts to
//! explicit remote paths and runs maintenance command batches, all over one
//! SSH session. Every attempted operation is recorded in a
//! `DeploymentReport` instead of aborting the run.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod manifest;
pub mod presentation;
pub mod ui;

// Re-exports for convenience
pub use application::{
    ArtifactWriter, CommandRunner, DeployOptions, DeploymentOrchestrator, PathSynchronizer,
};
pub use domain::entities::{
    ArtifactSpec, CommandBatch, CommandSpec, DeploymentPlan, DeploymentReport, StepError,
    StepKind, StepResult, SyncSpec,
};
pub use domain::ports::{RemoteSession, SessionConnector};
pub use domain::value_objects::{ConnectionConfig, Credential, RemotePath, Secret};
pub use error::{LockError, ManifestError, ManifestResult};
pub use infrastructure::{OpenSshConnector, OpenSshSession};
