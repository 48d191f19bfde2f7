//! Deployment Plan
//!
//! Caller-supplied inputs of one run: tree syncs, artifacts and command
//! batches. All of them are read-only once the run starts.

use std::path::PathBuf;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::domain::value_objects::{ExclusionSet, MaintenanceTask, RemotePath};

/// Timeout applied to commands that do not set their own
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Mirror `local_root` onto `remote_root`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSpec {
    pub local_root: PathBuf,
    pub remote_root: RemotePath,
    pub exclusions: ExclusionSet,
    /// Budget for the whole tree; `None` means unbounded
    pub timeout: Option<Duration>,
}

impl SyncSpec {
    pub fn new(local_root: impl Into<PathBuf>, remote_root: RemotePath) -> Self {
        Self {
            local_root: local_root.into(),
            remote_root,
            exclusions: ExclusionSet::default(),
            timeout: None,
        }
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Artifact content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Bytes(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

/// How an artifact treats existing remote content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    CreateOrOverwrite,
}

/// One generated file written to an explicit remote path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub remote_path: RemotePath,
    pub content: Payload,
    pub mode: WriteMode,
}

impl ArtifactSpec {
    pub fn new(remote_path: RemotePath, content: impl Into<Payload>) -> Self {
        Self {
            remote_path,
            content: content.into(),
            mode: WriteMode::CreateOrOverwrite,
        }
    }
}

/// One remote command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub command_line: String,
    /// Falls back to the batch default when unset
    pub timeout: Option<Duration>,
    /// Prefixed as `cd '<dir>' && ...`
    pub working_dir: Option<RemotePath>,
    pub description: Option<String>,
}

impl CommandSpec {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            timeout: None,
            working_dir: None,
            description: None,
        }
    }

    pub fn task(task: MaintenanceTask) -> Self {
        Self::new(task.command_line()).with_description(task.name())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_working_dir(mut self, dir: RemotePath) -> Self {
        self.working_dir = Some(dir);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn effective_timeout(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }

    /// Command line actually sent to the remote shell
    pub fn effective_command(&self) -> String {
        match &self.working_dir {
            Some(dir) => format!("cd {} && {}", shell_quote(dir.as_str()), self.command_line),
            None => self.command_line.clone(),
        }
    }
}

/// An ordered list of commands run one at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBatch {
    pub name: String,
    pub commands: Vec<CommandSpec>,
    /// Stop at the first failed command instead of continuing
    pub stop_on_failure: bool,
    pub default_timeout: Duration,
}

impl CommandBatch {
    pub fn new(name: impl Into<String>, commands: Vec<CommandSpec>) -> Self {
        Self {
            name: name.into(),
            commands,
            stop_on_failure: false,
            default_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }
}

/// Everything one run will do, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentPlan {
    pub syncs: Vec<SyncSpec>,
    /// Directories created before the first artifact is written
    pub ensure_dirs: Vec<RemotePath>,
    pub artifacts: Vec<ArtifactSpec>,
    /// Obsolete remote files removed after artifacts are written
    pub removals: Vec<RemotePath>,
    pub batches: Vec<CommandBatch>,
}

impl DeploymentPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.syncs.is_empty()
            && self.ensure_dirs.is_empty()
            && self.artifacts.is_empty()
            && self.removals.is_empty()
            && self.batches.is_empty()
    }

    pub fn command_count(&self) -> usize {
        self.batches.iter().map(|b| b.commands.len()).sum()
    }
}

/// Quote a string for a POSIX shell with single quotes
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// `sha256:<hex>` of a payload, the format recorded in step results
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}
