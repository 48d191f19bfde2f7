//! JSON Event Sink
//!
//! Outputs deploy events as NDJSON for CI/automation consumption.

use crate::domain::ports::{DeployEvent, DeployEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a JSON event sink writing to a custom writer (for testing)
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

/// JSON value for one event
pub fn event_json(event: &DeployEvent) -> serde_json::Value {
    match event {
        DeployEvent::Connecting { target } => serde_json::json!({
            "event": "connecting",
            "command": "deploy",
            "target": target,
        }),

        DeployEvent::Connected { target } => serde_json::json!({
            "event": "connected",
            "command": "deploy",
            "target": target,
        }),

        DeployEvent::ConnectionFailed { target, error } => serde_json::json!({
            "event": "connection_failed",
            "command": "deploy",
            "target": target,
            "error": error,
        }),

        DeployEvent::SyncStarted { local, remote } => serde_json::json!({
            "event": "sync_start",
            "command": "deploy",
            "local": local.display().to_string(),
            "remote": remote,
        }),

        DeployEvent::StageStarted { stage, count } => serde_json::json!({
            "event": "stage_start",
            "command": "deploy",
            "stage": stage.as_str(),
            "count": count,
        }),

        DeployEvent::BatchStarted { name, commands } => serde_json::json!({
            "event": "batch_start",
            "command": "deploy",
            "name": name,
            "commands": commands,
        }),

        DeployEvent::CommandStarted { command } => serde_json::json!({
            "event": "command_start",
            "command": "deploy",
            "command_line": command,
        }),

        DeployEvent::StepRecorded { index, step } => serde_json::json!({
            "event": "step",
            "command": "deploy",
            "index": index,
            "step": step,
        }),

        DeployEvent::Cancelled => serde_json::json!({
            "event": "cancelled",
            "command": "deploy",
        }),

        DeployEvent::Disconnected { target } => serde_json::json!({
            "event": "disconnected",
            "command": "deploy",
            "target": target,
        }),

        DeployEvent::Completed {
            success,
            steps,
            failures,
        } => {
            let status = match (success, failures) {
                (true, 0) => "success",
                (true, _) => "partial",
                (false, _) => "failed",
            };
            serde_json::json!({
                "event": "complete",
                "command": "deploy",
                "status": status,
                "steps": steps,
                "failures": failures,
            })
        }
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        self.write_event(event_json(&event));
    }

    fn wants_detailed_events(&self) -> bool {
        true // JSON mode wants all events
    }
}
