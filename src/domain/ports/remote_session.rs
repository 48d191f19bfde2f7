//! Remote Session Port
//!
//! Abstracts one authenticated connection to a remote host. The session
//! offers two channels: a file channel (mkdir, write, remove) and a command
//! channel (execute with captured output). Use cases only ever talk to the
//! remote host through these traits.

use std::time::Duration;

use crate::domain::value_objects::{ConnectionConfig, RemotePath};

/// Failure to establish a session. Fatal to a whole deployment run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Host could not be reached (DNS, refused, network down)
    #[error("cannot reach {target}: {message}")]
    Unreachable { target: String, message: String },

    /// Host answered but rejected the credential
    #[error("authentication failed for {target}: {message}")]
    AuthenticationFailed { target: String, message: String },

    /// Handshake did not complete within the connect timeout
    #[error("connection to {target} timed out after {after_secs}s")]
    Timeout { target: String, after_secs: u64 },

    /// The local transport could not be started
    #[error("cannot start transport: {0}")]
    Transport(String),

    /// Cancelled while connecting
    #[error("connection cancelled")]
    Cancelled,
}

/// Failure of a single operation on an open session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// `create_dir` target already exists as a directory. Never a failure.
    #[error("directory already exists: {0}")]
    DirectoryExists(RemotePath),

    /// The remote side ran the operation and reported an error
    #[error("{operation} failed (status {status:?}): {message}")]
    Remote {
        operation: String,
        status: Option<i32>,
        message: String,
    },

    /// Operation exceeded its time budget
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout { operation: String, after: Duration },

    /// Operation was aborted through the cancellation token
    #[error("{operation} cancelled")]
    Cancelled { operation: String },

    /// The connection was lost mid-operation
    #[error("session disconnected: {0}")]
    Disconnected(String),

    /// Operation attempted after `close`
    #[error("session is closed")]
    Closed,
}

impl SessionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionError::Cancelled { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Timeout { .. })
    }
}

/// Captured result of a remote command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit status; `None` when the process ended without one (signal)
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// File operations on the remote host
pub trait FileChannel {
    /// Create a single directory. Parents must exist.
    ///
    /// Returns `SessionError::DirectoryExists` when the directory is already
    /// there, so callers can tell it apart from real failures.
    fn create_dir(&self, path: &RemotePath) -> Result<(), SessionError>;

    /// Create or overwrite a file with the given bytes
    fn write_file(&self, path: &RemotePath, contents: &[u8]) -> Result<(), SessionError>;

    /// Remove a file; a missing file is not an error
    fn remove_file(&self, path: &RemotePath) -> Result<(), SessionError>;
}

/// Command execution on the remote host
pub trait CommandChannel {
    /// Run a shell command line, buffering its full stdout and stderr
    fn execute(&self, command: &str, timeout: Duration) -> Result<CommandOutput, SessionError>;
}

/// One open, authenticated session
pub trait RemoteSession: FileChannel + CommandChannel {
    /// Human-readable `user@host:port`
    fn target(&self) -> String;

    fn is_open(&self) -> bool;

    /// Release the connection. Idempotent.
    fn close(&mut self);
}

/// Opens sessions from a connection config
pub trait SessionConnector {
    type Session: RemoteSession;

    fn open(&self, config: &ConnectionConfig) -> Result<Self::Session, ConnectionError>;
}
