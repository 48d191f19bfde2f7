//! Domain Entities

mod plan;
mod report;
mod step;

pub use plan::{
    content_digest, shell_quote, ArtifactSpec, CommandBatch, CommandSpec, DeploymentPlan,
    Payload, SyncSpec, WriteMode, DEFAULT_COMMAND_TIMEOUT,
};
pub use report::{DeploymentReport, ReportBuilder};
pub use step::{StepError, StepKind, StepResult};
