//! What a tree sync does after a file fails to transfer

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferFailurePolicy {
    /// Record the failure and continue with the next entry
    #[default]
    SkipFile,
    /// Record the failure and stop processing the rest of that directory
    AbortSubtree,
}
