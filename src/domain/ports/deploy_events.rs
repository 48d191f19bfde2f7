//! Deploy Event Port
//!
//! Observable progress of a deployment run. Sinks turn events into console
//! lines, NDJSON streams, or nothing at all.

use std::path::PathBuf;

use crate::domain::entities::StepResult;

/// Stage of a run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sync,
    EnsureDirs,
    Artifacts,
    Removals,
    Commands,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Sync => "sync",
            Stage::EnsureDirs => "ensure-dirs",
            Stage::Artifacts => "artifacts",
            Stage::Removals => "removals",
            Stage::Commands => "commands",
        }
    }
}

/// Event emitted during a deployment run
#[derive(Debug, Clone)]
pub enum DeployEvent {
    /// About to open the session
    Connecting { target: String },

    /// Session is open
    Connected { target: String },

    /// Session could not be opened; the run ends here
    ConnectionFailed { target: String, error: String },

    /// A tree sync is starting
    SyncStarted { local: PathBuf, remote: String },

    /// A stage with `count` inputs is starting
    StageStarted { stage: Stage, count: usize },

    /// A command batch is starting
    BatchStarted { name: String, commands: usize },

    /// A command is about to run
    CommandStarted { command: String },

    /// A step finished (successfully or not)
    StepRecorded { index: usize, step: StepResult },

    /// Cancellation was observed; no further operations are issued
    Cancelled,

    /// Session released
    Disconnected { target: String },

    /// Run finished
    Completed {
        success: bool,
        steps: usize,
        failures: usize,
    },
}

/// Trait for receiving deploy events
pub trait DeployEventSink: Send + Sync {
    fn on_event(&self, event: DeployEvent);

    /// Whether this sink wants per-step events or only summaries
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
