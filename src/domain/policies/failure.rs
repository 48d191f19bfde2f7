//! Command failure classification
//!
//! Deciding whether a finished command "failed" is a policy, not a fact:
//! capability probes such as `which node` routinely print to stderr without
//! anything being wrong. The runner asks a `FailureClassifier`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::ports::CommandOutput;

/// Returns `Some(reason)` when the output represents a failure
pub trait FailureClassifier: Send + Sync {
    fn classify(&self, output: &CommandOutput) -> Option<String>;
}

impl<F> FailureClassifier for F
where
    F: Fn(&CommandOutput) -> Option<String> + Send + Sync,
{
    fn classify(&self, output: &CommandOutput) -> Option<String> {
        self(output)
    }
}

/// Only the exit status decides; stderr is informational
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitStatusOnly;

impl FailureClassifier for ExitStatusOnly {
    fn classify(&self, output: &CommandOutput) -> Option<String> {
        status_failure(output)
    }
}

/// Nonzero exit, or any stderr text not matching an ignore substring
#[derive(Debug, Clone, Default)]
pub struct StrictStderr {
    pub ignore: Vec<String>,
}

impl StrictStderr {
    pub fn new(ignore: Vec<String>) -> Self {
        Self { ignore }
    }
}

impl FailureClassifier for StrictStderr {
    fn classify(&self, output: &CommandOutput) -> Option<String> {
        if let Some(reason) = status_failure(output) {
            return Some(reason);
        }
        let stderr = output.stderr.trim();
        if stderr.is_empty() || self.ignore.iter().any(|needle| stderr.contains(needle.as_str())) {
            return None;
        }
        let first_line = stderr.lines().next().unwrap_or(stderr);
        Some(format!("wrote to stderr: {}", first_line))
    }
}

/// Manifest-level selection of a built-in classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StderrPolicy {
    #[default]
    ExitStatus,
    Strict,
}

impl StderrPolicy {
    pub fn classifier(&self, ignore: Vec<String>) -> Arc<dyn FailureClassifier> {
        match self {
            StderrPolicy::ExitStatus => Arc::new(ExitStatusOnly),
            StderrPolicy::Strict => Arc::new(StrictStderr::new(ignore)),
        }
    }
}

fn status_failure(output: &CommandOutput) -> Option<String> {
    match output.status {
        Some(0) => None,
        Some(code) => Some(format!("exited with status {}", code)),
        None => Some("terminated without an exit status".to_string()),
    }
}
