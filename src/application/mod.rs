//! Application Layer
//!
//! Use cases that drive a deployment through the domain ports.
//! This layer:
//! - Depends on Domain layer (entities, policies, ports)
//! - Never opens connections itself; a `SessionConnector` does that
//! - Turns every remote outcome into a `StepResult`
//!
//! ## Use Cases
//!
//! - `DeploymentOrchestrator` - One run: open, sync, write, run commands, close
//! - `PathSynchronizer` - Mirror a local tree onto a remote root
//! - `ArtifactWriter` - Write generated files, create directories, remove files
//! - `CommandRunner` - Run command batches in order with per-command timeouts

pub mod artifact;
pub mod commands;
pub mod deploy;
mod recorder;
pub mod sync;

#[cfg(test)]
mod test_support;

pub use artifact::ArtifactWriter;
pub use commands::CommandRunner;
pub use deploy::{DeployOptions, DeploymentOrchestrator};
pub use recorder::StepRecorder;
pub use sync::PathSynchronizer;
