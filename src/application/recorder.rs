//! Step recorder
//!
//! Collects step results for one stage and forwards each one to the event
//! sink as it happens, so long syncs and slow commands report progress
//! before the stage returns.

use std::sync::Arc;

use crate::domain::entities::StepResult;
use crate::domain::ports::{DeployEvent, DeployEventSink, NoopEventSink};

pub struct StepRecorder {
    steps: Vec<StepResult>,
    base_index: usize,
    sink: Arc<dyn DeployEventSink>,
}

impl StepRecorder {
    /// `base_index` is the report position of the first step recorded here
    pub fn new(sink: Arc<dyn DeployEventSink>, base_index: usize) -> Self {
        Self {
            steps: Vec::new(),
            base_index,
            sink,
        }
    }

    pub fn silent() -> Self {
        Self::new(Arc::new(NoopEventSink), 0)
    }

    pub fn record(&mut self, step: StepResult) {
        if self.sink.wants_detailed_events() {
            self.sink.on_event(DeployEvent::StepRecorded {
                index: self.base_index + self.steps.len(),
                step: step.clone(),
            });
        }
        self.steps.push(step);
    }

    pub fn emit(&self, event: DeployEvent) {
        self.sink.on_event(event);
    }

    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<StepResult> {
        self.steps
    }
}
