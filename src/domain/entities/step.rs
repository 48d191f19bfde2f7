//! Step Result Entity
//!
//! One attempted operation of a deployment run and its outcome.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Outcome category of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    DirCreated,
    DirSkippedExists,
    DirFailed,
    FileWritten,
    FileRemoved,
    TransferFailed,
    CommandOk,
    CommandFailed,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::DirCreated => "dir-created",
            StepKind::DirSkippedExists => "dir-skipped-exists",
            StepKind::DirFailed => "dir-failed",
            StepKind::FileWritten => "file-written",
            StepKind::FileRemoved => "file-removed",
            StepKind::TransferFailed => "transfer-failed",
            StepKind::CommandOk => "command-ok",
            StepKind::CommandFailed => "command-failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StepKind::DirFailed | StepKind::TransferFailed | StepKind::CommandFailed
        )
    }

    pub fn is_command(&self) -> bool {
        matches!(self, StepKind::CommandOk | StepKind::CommandFailed)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a step failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StepError {
    /// Remote directory could not be created
    #[error("cannot create directory: {message}")]
    Directory { message: String },

    /// File could not be read locally or written/removed remotely
    #[error("transfer failed: {message}")]
    Transfer { message: String },

    /// Command exceeded its timeout
    #[error("command timed out after {after_secs}s")]
    CommandTimeout { after_secs: u64 },

    /// Command ran and was classified as failed
    #[error("command failed: {reason}")]
    CommandFailure { status: Option<i32>, reason: String },

    /// Aborted through the cancellation token
    #[error("cancelled")]
    Cancelled,
}

/// Record of one attempted operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    pub kind: StepKind,
    /// Remote path, or the command line as given
    pub target: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
    /// Payload size for file writes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    /// `sha256:<hex>` of the payload for file writes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    pub duration_ms: u64,
}

impl StepResult {
    pub fn new(kind: StepKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            stdout: String::new(),
            stderr: String::new(),
            error: None,
            bytes: None,
            digest: None,
            duration_ms: 0,
        }
    }

    pub fn failed(kind: StepKind, target: impl Into<String>, error: StepError) -> Self {
        Self::new(kind, target).with_error(error)
    }

    pub fn with_error(mut self, error: StepError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_output(mut self, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self.stderr = stderr.into();
        self
    }

    pub fn with_payload(mut self, bytes: u64, digest: impl Into<String>) -> Self {
        self.bytes = Some(bytes);
        self.digest = Some(digest.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn is_failure(&self) -> bool {
        self.kind.is_failure()
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.error, Some(StepError::Cancelled))
    }
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.target)?;
        if let Some(error) = &self.error {
            write!(f, ": {}", error)?;
        }
        Ok(())
    }
}
