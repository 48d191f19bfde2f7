//! Manifest loading and resolution

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::entities::{
    ArtifactSpec, CommandBatch, CommandSpec, DeploymentPlan, Payload, SyncSpec,
    DEFAULT_COMMAND_TIMEOUT,
};
use crate::application::DeployOptions;
use crate::domain::value_objects::{ConnectionConfig, Credential, ExclusionSet, RemotePath, Secret};
use crate::error::{ManifestError, ManifestResult};

use super::types::{ArtifactFileSection, CommandSection, Manifest, DEFAULT_PASSWORD_ENV};

/// Non-fatal manifest warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ManifestWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load a manifest and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> ManifestResult<(Manifest, Vec<ManifestWarning>)> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_with_warnings(&content, path)
}

/// Parse manifest text; `path` is only used in messages
pub fn parse_with_warnings(
    content: &str,
    path: &Path,
) -> ManifestResult<(Manifest, Vec<ManifestWarning>)> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let manifest: Manifest = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ManifestError::Invalid {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ManifestWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((manifest, warnings))
}

/// Apply `RDEPLOY_HOST`, `RDEPLOY_PORT`, `RDEPLOY_USER` and `RDEPLOY_SSH`
pub fn with_env_overrides(
    mut manifest: Manifest,
    get_env: impl Fn(&str) -> Option<String>,
) -> ManifestResult<Manifest> {
    if let Some(host) = get_env("RDEPLOY_HOST") {
        manifest.connection.host = host;
    }
    if let Some(port) = get_env("RDEPLOY_PORT") {
        manifest.connection.port =
            port.trim()
                .parse()
                .map_err(|_| ManifestError::InvalidOverride {
                    name: "RDEPLOY_PORT".to_string(),
                    value: port.clone(),
                })?;
    }
    if let Some(user) = get_env("RDEPLOY_USER") {
        manifest.connection.username = user;
    }
    if let Some(program) = get_env("RDEPLOY_SSH") {
        manifest.connection.ssh_program = Some(PathBuf::from(program));
    }
    Ok(manifest)
}

impl Manifest {
    /// Build the connection config, reading the password from the
    /// environment when password authentication is used.
    pub fn connection_config(
        &self,
        manifest_path: &Path,
        get_env: impl Fn(&str) -> Option<String>,
    ) -> ManifestResult<ConnectionConfig> {
        let credential = self.credential(manifest_path, get_env)?;
        let section = &self.connection;

        let connection_error = |source| ManifestError::Connection {
            file: manifest_path.to_path_buf(),
            source,
        };
        let mut config = ConnectionConfig::new(
            section.host.as_str(),
            section.port,
            section.username.as_str(),
            credential,
        )
        .map_err(connection_error)?
        .with_host_key_policy(section.host_key_policy);

        if let Some(secs) = section.connect_timeout_secs {
            config = config
                .with_connect_timeout(Duration::from_secs(secs))
                .map_err(connection_error)?;
        }
        Ok(config)
    }

    /// Name of the environment variable consulted for the password, if
    /// password authentication is configured
    pub fn password_env(&self) -> Option<&str> {
        if self.connection.identity_file.is_some() {
            return None;
        }
        Some(
            self.connection
                .password_env
                .as_deref()
                .unwrap_or(DEFAULT_PASSWORD_ENV),
        )
    }

    fn credential(
        &self,
        manifest_path: &Path,
        get_env: impl Fn(&str) -> Option<String>,
    ) -> ManifestResult<Credential> {
        let section = &self.connection;
        match (&section.identity_file, &section.password_env) {
            (Some(_), Some(_)) => Err(ManifestError::Credential {
                message: "set either `password_env` or `identity_file` in [connection], not both"
                    .to_string(),
            }),
            (Some(identity), None) => Ok(Credential::IdentityFile(resolve_local(
                base_dir(manifest_path),
                identity,
            ))),
            (None, _) => {
                let name = self.password_env().unwrap_or(DEFAULT_PASSWORD_ENV);
                match get_env(name) {
                    Some(value) if !value.is_empty() => Ok(Credential::Password(Secret::new(value))),
                    _ => Err(ManifestError::MissingSecret {
                        name: name.to_string(),
                    }),
                }
            }
        }
    }

    /// Resolve local paths and read artifact sources into a plan
    pub fn plan(&self, manifest_path: &Path) -> ManifestResult<DeploymentPlan> {
        let base = base_dir(manifest_path);
        let mut plan = DeploymentPlan::new();

        for section in &self.sync {
            let mut spec = SyncSpec::new(resolve_local(base, &section.local), section.remote.clone());
            if let Some(names) = &section.exclude {
                spec = spec.with_exclusions(ExclusionSet::from_names(names.iter().cloned()));
            }
            if let Some(secs) = section.timeout_secs {
                spec = spec.with_timeout(nonzero_secs(secs, "sync.timeout_secs")?);
            }
            plan.syncs.push(spec);
        }

        plan.ensure_dirs = self.artifacts.ensure_dirs.clone();
        for file in &self.artifacts.files {
            plan.artifacts.push(artifact_spec(base, file)?);
        }
        plan.removals = self.artifacts.remove.clone();

        let default_timeout = match self.defaults.command_timeout_secs {
            Some(secs) => nonzero_secs(secs, "defaults.command_timeout_secs")?,
            None => DEFAULT_COMMAND_TIMEOUT,
        };
        for batch in &self.batches {
            let batch_timeout = match batch.timeout_secs {
                Some(secs) => nonzero_secs(secs, "batch.timeout_secs")?,
                None => default_timeout,
            };
            let commands = batch
                .commands
                .iter()
                .enumerate()
                .map(|(index, command)| {
                    command_spec(&batch.name, index + 1, command, batch.working_dir.as_ref())
                })
                .collect::<ManifestResult<Vec<_>>>()?;
            plan.batches.push(
                CommandBatch::new(batch.name.clone(), commands)
                    .with_stop_on_failure(batch.stop_on_failure)
                    .with_default_timeout(batch_timeout),
            );
        }

        Ok(plan)
    }

    /// Run-wide policies from `[defaults]`
    pub fn deploy_options(&self) -> DeployOptions {
        DeployOptions::new()
            .with_transfer_policy(self.defaults.on_transfer_error)
            .with_stderr_policy(
                self.defaults.stderr_policy,
                self.defaults.ignore_stderr.clone(),
            )
    }

    /// Budget for each single file operation
    pub fn transfer_timeout(&self) -> ManifestResult<Option<Duration>> {
        self.defaults
            .transfer_timeout_secs
            .map(|secs| nonzero_secs(secs, "defaults.transfer_timeout_secs"))
            .transpose()
    }
}

/// Keep only the named batches, in manifest order
pub fn select_batches(plan: &mut DeploymentPlan, names: &[String]) -> ManifestResult<()> {
    if names.is_empty() {
        return Ok(());
    }
    if let Some(missing) = names
        .iter()
        .find(|name| !plan.batches.iter().any(|batch| &batch.name == *name))
    {
        return Err(ManifestError::UnknownBatch {
            name: missing.clone(),
        });
    }
    plan.batches.retain(|batch| names.contains(&batch.name));
    Ok(())
}

fn artifact_spec(base: &Path, file: &ArtifactFileSection) -> ManifestResult<ArtifactSpec> {
    let payload = match (&file.source, &file.content) {
        (Some(source), None) => {
            let path = resolve_local(base, source);
            let bytes = fs::read(&path)
                .map_err(|source| ManifestError::ArtifactSource { path, source })?;
            Payload::Bytes(bytes)
        }
        (None, Some(content)) => Payload::Text(content.clone()),
        _ => {
            return Err(ManifestError::ArtifactContent {
                remote: file.remote.to_string(),
            })
        }
    };
    Ok(ArtifactSpec::new(file.remote.clone(), payload))
}

fn command_spec(
    batch: &str,
    index: usize,
    command: &CommandSection,
    batch_dir: Option<&RemotePath>,
) -> ManifestResult<CommandSpec> {
    let mut spec = match (&command.run, command.task) {
        (Some(line), None) if !line.trim().is_empty() => CommandSpec::new(line.trim()),
        (None, Some(task)) => CommandSpec::task(task),
        _ => {
            return Err(ManifestError::CommandLine {
                batch: batch.to_string(),
                index,
            })
        }
    };
    if let Some(secs) = command.timeout_secs {
        spec = spec.with_timeout(nonzero_secs(secs, "batch.commands.timeout_secs")?);
    }
    if let Some(dir) = command.working_dir.as_ref().or(batch_dir) {
        spec = spec.with_working_dir(dir.clone());
    }
    Ok(spec)
}

fn nonzero_secs(secs: u64, field: &str) -> ManifestResult<Duration> {
    if secs == 0 {
        return Err(ManifestError::ZeroTimeout {
            field: field.to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn base_dir(manifest_path: &Path) -> &Path {
    manifest_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

/// Expand `~` and make relative paths relative to `base`
pub fn resolve_local(base: &Path, path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "connection",
        "host",
        "port",
        "username",
        "password_env",
        "identity_file",
        "host_key_policy",
        "connect_timeout_secs",
        "ssh_program",
        "defaults",
        "command_timeout_secs",
        "transfer_timeout_secs",
        "stderr_policy",
        "ignore_stderr",
        "on_transfer_error",
        "sync",
        "local",
        "remote",
        "exclude",
        "timeout_secs",
        "artifacts",
        "ensure_dirs",
        "remove",
        "files",
        "source",
        "content",
        "batch",
        "name",
        "working_dir",
        "stop_on_failure",
        "commands",
        "run",
        "task",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
