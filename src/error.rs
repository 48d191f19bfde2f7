//! Error types for rdeploy
//!
//! Uses `thiserror` for library errors. Remote failures during a run are not
//! errors at this level; they are recorded as steps in the report.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::value_objects::ConfigError;

/// Result type alias for manifest operations
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Failure to load or resolve a deployment manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file could not be read
    #[error("cannot read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or type error
    #[error("invalid manifest {file}: {message}")]
    Invalid { file: PathBuf, message: String },

    /// Connection settings failed validation
    #[error("invalid connection settings in {file}: {source}")]
    Connection {
        file: PathBuf,
        #[source]
        source: ConfigError,
    },

    /// Neither or both of `password_env` / `identity_file` usable
    #[error("{message}")]
    Credential { message: String },

    /// Password variable named by `password_env` is not set
    #[error("environment variable {name} is not set; it must hold the SSH password")]
    MissingSecret { name: String },

    /// An environment override could not be parsed
    #[error("invalid value for {name}: {value}")]
    InvalidOverride { name: String, value: String },

    /// Artifact `source` file could not be read
    #[error("cannot read artifact source {path}: {source}")]
    ArtifactSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact entry with neither or both of `source` and `content`
    #[error("artifact {remote} must set exactly one of `source` or `content`")]
    ArtifactContent { remote: String },

    /// Command entry with neither or both of `run` and `task`
    #[error("command #{index} in batch '{batch}' must set exactly one of `run` or `task`")]
    CommandLine { batch: String, index: usize },

    /// A zero timeout anywhere in the manifest
    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: String },

    /// `--batch` named a batch the manifest does not define
    #[error("unknown batch '{name}'")]
    UnknownBatch { name: String },
}

/// Failure to take the local deployment lock
#[derive(Error, Debug)]
pub enum LockError {
    /// Another process holds the lock
    #[error("another deployment to {target} is already running (lock file {path})")]
    Busy { target: String, path: PathBuf },

    /// No cache directory to put lock files in
    #[error("cannot determine a cache directory for lock files")]
    NoCacheDir,

    /// Lock file could not be created
    #[error("cannot create lock file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
