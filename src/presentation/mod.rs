//! Presentation Layer
//!
//! This layer handles:
//! - Creating use cases with infrastructure dependencies
//! - Report formatting (text/JSON)
//!
//! ## Structure
//!
//! - `factory` - Creates the orchestrator from a manifest (dependency injection)
//! - `output` - Report rendering

pub mod factory;
pub mod output;

pub use factory::{create_orchestrator, ConcreteOrchestrator};
pub use output::{create_renderer, JsonRenderer, OutputFormat, ReportRenderer, TextRenderer};
