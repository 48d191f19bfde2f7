//! Deploy Module
//!
//! Orchestrates one deployment run against a single remote host.
//!
//! ## Structure
//!
//! - `options` - Run configuration (`DeployOptions`)
//! - `use_case` - Core orchestration (`DeploymentOrchestrator`)
//!
//! ## Usage
//!
//! ```ignore
//! use rdeploy::application::deploy::{DeployOptions, DeploymentOrchestrator};
//! use rdeploy::infrastructure::OpenSshConnector;
//!
//! let orchestrator = DeploymentOrchestrator::new(OpenSshConnector::new(), DeployOptions::new());
//! let report = orchestrator.deploy_plan(&config, &plan);
//! ```

mod options;
mod use_case;

pub use options::DeployOptions;
pub use use_case::DeploymentOrchestrator;
