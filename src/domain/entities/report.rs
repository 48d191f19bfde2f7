//! Deployment Report
//!
//! The ordered record of every step a deployment run attempted. A report is
//! assembled by the orchestrator and is read-only once handed back.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::step::{StepKind, StepResult};

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    target: String,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    connection_error: Option<String>,
    cancelled: bool,
    steps: Vec<StepResult>,
}

impl DeploymentReport {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Whether the session was opened at all
    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn connection_error(&self) -> Option<&str> {
        self.connection_error.as_deref()
    }

    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    /// True iff the session opened, the run was not cancelled and no command
    /// failed. Directory-already-exists and transfer failures do not affect
    /// this flag; see [`DeploymentReport::failed_steps`].
    pub fn success(&self) -> bool {
        self.connected
            && !self.cancelled
            && !self
                .steps
                .iter()
                .any(|step| step.kind == StepKind::CommandFailed)
    }

    /// Every failed step, of any kind, in run order
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepResult> {
        self.steps.iter().filter(|step| step.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.failed_steps().next().is_some()
    }

    pub fn count(&self, kind: StepKind) -> usize {
        self.steps.iter().filter(|step| step.kind == kind).count()
    }

    pub fn command_steps(&self) -> impl Iterator<Item = &StepResult> {
        self.steps.iter().filter(|step| step.kind.is_command())
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Accumulates steps during a run; consumed by `finish`
#[derive(Debug)]
pub struct ReportBuilder {
    report: DeploymentReport,
}

impl ReportBuilder {
    pub fn new(target: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            report: DeploymentReport {
                target: target.into(),
                started_at: now,
                finished_at: now,
                connected: false,
                connection_error: None,
                cancelled: false,
                steps: Vec::new(),
            },
        }
    }

    pub fn connected(&mut self) {
        self.report.connected = true;
    }

    pub fn connection_failed(&mut self, error: impl Into<String>) {
        self.report.connected = false;
        self.report.connection_error = Some(error.into());
    }

    pub fn cancelled(&mut self) {
        self.report.cancelled = true;
    }

    pub fn push(&mut self, step: StepResult) {
        self.report.steps.push(step);
    }

    pub fn extend(&mut self, steps: impl IntoIterator<Item = StepResult>) {
        self.report.steps.extend(steps);
    }

    pub fn step_count(&self) -> usize {
        self.report.steps.len()
    }

    pub fn finish(mut self) -> DeploymentReport {
        self.report.finished_at = Utc::now();
        self.report
    }
}
