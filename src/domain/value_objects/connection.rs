//! Connection configuration value objects
//!
//! `ConnectionConfig` is validated once at construction and is immutable
//! afterwards. Secrets never appear in `Debug` output and are never
//! serialized.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default budget for establishing a session
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Validation failure for a connection configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("connection {0} must not be empty")]
    EmptyField(&'static str),
    #[error("connection {0} must not start with '-'")]
    LeadingDash(&'static str),
    #[error("port {0} is out of range (expected 1-65535)")]
    PortOutOfRange(u32),
    #[error("connect timeout must be greater than zero")]
    ZeroTimeout,
}

/// A password or passphrase that is redacted when printed
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret value. Only the transport should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// How the session authenticates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Password authentication
    Password(Secret),
    /// Public key authentication with a private key file
    IdentityFile(PathBuf),
}

impl Credential {
    fn is_empty(&self) -> bool {
        match self {
            Credential::Password(secret) => secret.is_empty(),
            Credential::IdentityFile(path) => path.as_os_str().is_empty(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Credential::Password(_) => "password",
            Credential::IdentityFile(_) => "identity-file",
        }
    }
}

/// What to do with the remote host's key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Only connect to hosts already present in known_hosts
    Strict,
    /// Trust and remember unknown hosts on first contact; reject changed keys
    #[default]
    AcceptNew,
    /// Trust any key, never remember it
    AcceptAny,
}

impl HostKeyPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostKeyPolicy::Strict => "strict",
            HostKeyPolicy::AcceptNew => "accept-new",
            HostKeyPolicy::AcceptAny => "accept-any",
        }
    }
}

/// Everything needed to open one session to one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    host: String,
    port: u16,
    username: String,
    credential: Credential,
    host_key_policy: HostKeyPolicy,
    connect_timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(
        host: impl Into<String>,
        port: u32,
        username: impl Into<String>,
        credential: Credential,
    ) -> Result<Self, ConfigError> {
        let host = host.into().trim().to_string();
        let username = username.into().trim().to_string();

        if host.is_empty() {
            return Err(ConfigError::EmptyField("host"));
        }
        if username.is_empty() {
            return Err(ConfigError::EmptyField("username"));
        }
        // ssh would parse either as an option
        if host.starts_with('-') {
            return Err(ConfigError::LeadingDash("host"));
        }
        if username.starts_with('-') {
            return Err(ConfigError::LeadingDash("username"));
        }
        if credential.is_empty() {
            return Err(ConfigError::EmptyField("credential"));
        }
        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or(ConfigError::PortOutOfRange(port))?;

        Ok(Self {
            host,
            port,
            username,
            credential,
            host_key_policy: HostKeyPolicy::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        })
    }

    pub fn with_host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = policy;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        self.connect_timeout = timeout;
        Ok(self)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn host_key_policy(&self) -> HostKeyPolicy {
        self.host_key_policy
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// `user@host:port`, for messages and lock keys
    pub fn display_target(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }
}
