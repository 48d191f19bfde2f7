//! Domain Policies
//!
//! Caller-selectable rules the use cases consult instead of hard-coding.

mod failure;
mod transfer;

pub use failure::{ExitStatusOnly, FailureClassifier, StderrPolicy, StrictStderr};
pub use transfer::TransferFailurePolicy;
