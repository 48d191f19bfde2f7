//! Deploy Options
//!
//! Policies applied across a whole run.

use std::fmt;
use std::sync::Arc;

use crate::domain::policies::{ExitStatusOnly, FailureClassifier, StderrPolicy, TransferFailurePolicy};
use crate::domain::value_objects::CancellationToken;

/// Options for the deploy use case
#[derive(Clone)]
pub struct DeployOptions {
    /// What a failed file write does to the rest of its directory
    pub transfer_policy: TransferFailurePolicy,
    /// Decides whether a finished command failed
    pub classifier: Arc<dyn FailureClassifier>,
    /// Checked between operations; set from the Ctrl-C handler
    pub cancel: CancellationToken,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DeployOptions {
    pub fn new() -> Self {
        Self {
            transfer_policy: TransferFailurePolicy::default(),
            classifier: Arc::new(ExitStatusOnly),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_transfer_policy(mut self, policy: TransferFailurePolicy) -> Self {
        self.transfer_policy = policy;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn FailureClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Select one of the built-in classifiers
    pub fn with_stderr_policy(self, policy: StderrPolicy, ignore: Vec<String>) -> Self {
        self.with_classifier(policy.classifier(ignore))
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl fmt::Debug for DeployOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployOptions")
            .field("transfer_policy", &self.transfer_policy)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
