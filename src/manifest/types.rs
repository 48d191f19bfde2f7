//! Manifest types
//!
//! The on-disk shape of `deploy.toml`. Everything here is plain data; the
//! loader turns it into a `ConnectionConfig` and a `DeploymentPlan`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::policies::{StderrPolicy, TransferFailurePolicy};
use crate::domain::value_objects::{HostKeyPolicy, MaintenanceTask, RemotePath};

/// Variable holding the SSH password when `password_env` is not set
pub const DEFAULT_PASSWORD_ENV: &str = "RDEPLOY_PASSWORD";

/// Default manifest file name
pub const DEFAULT_MANIFEST: &str = "deploy.toml";

/// Root of `deploy.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub connection: ConnectionSection,

    #[serde(default)]
    pub defaults: DefaultsSection,

    #[serde(default)]
    pub sync: Vec<SyncSection>,

    #[serde(default)]
    pub artifacts: ArtifactsSection,

    #[serde(default, rename = "batch")]
    pub batches: Vec<BatchSection>,
}

/// `[connection]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSection {
    /// May be left empty and supplied through `RDEPLOY_HOST`
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u32,

    #[serde(default)]
    pub username: String,

    /// Name of the variable holding the password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Private key used instead of a password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<PathBuf>,

    #[serde(default)]
    pub host_key_policy: HostKeyPolicy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_program: Option<PathBuf>,
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            username: String::new(),
            password_env: None,
            identity_file: None,
            host_key_policy: HostKeyPolicy::default(),
            connect_timeout_secs: None,
            ssh_program: None,
        }
    }
}

fn default_port() -> u32 {
    22
}

/// `[defaults]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_timeout_secs: Option<u64>,

    /// Budget for each single file operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_timeout_secs: Option<u64>,

    #[serde(default)]
    pub stderr_policy: StderrPolicy,

    /// Substrings that make stderr harmless under the strict policy
    #[serde(default)]
    pub ignore_stderr: Vec<String>,

    #[serde(default)]
    pub on_transfer_error: TransferFailurePolicy,
}

/// `[[sync]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSection {
    /// Relative to the manifest directory
    pub local: PathBuf,

    pub remote: RemotePath,

    /// Bare names to skip; the built-in defaults when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// `[artifacts]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactsSection {
    #[serde(default)]
    pub ensure_dirs: Vec<RemotePath>,

    #[serde(default)]
    pub remove: Vec<RemotePath>,

    #[serde(default)]
    pub files: Vec<ArtifactFileSection>,
}

/// `[[artifacts.files]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFileSection {
    pub remote: RemotePath,

    /// Local file whose bytes are uploaded; relative to the manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,

    /// Inline text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// `[[batch]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSection {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<RemotePath>,

    #[serde(default)]
    pub stop_on_failure: bool,

    /// Overrides `defaults.command_timeout_secs` for this batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub commands: Vec<CommandSection>,
}

/// `[[batch.commands]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<MaintenanceTask>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Overrides the batch working directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<RemotePath>,
}
