//! Remote Path Value Object
//!
//! A POSIX path on the remote host. Remote paths never go through
//! `std::path::Path` because the local OS may use a different separator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error when a remote path fails validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemotePathError {
    /// Path is empty
    #[error("remote path is empty")]
    Empty,
    /// Path contains a NUL byte
    #[error("remote path '{0}' contains a NUL byte")]
    ContainsNul(String),
}

/// A validated remote path
///
/// Trailing slashes are stripped (except for `/` itself) and repeated
/// separators are collapsed, so `/srv//backend/` and `/srv/backend`
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemotePath(String);

impl RemotePath {
    pub fn new(path: impl AsRef<str>) -> Result<Self, RemotePathError> {
        let raw = path.as_ref();
        if raw.trim().is_empty() {
            return Err(RemotePathError::Empty);
        }
        if raw.contains('\0') {
            return Err(RemotePathError::ContainsNul(raw.replace('\0', "\\0")));
        }

        let absolute = raw.starts_with('/');
        let joined = raw
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");

        let normalized = match (absolute, joined.is_empty()) {
            (true, true) => "/".to_string(),
            (true, false) => format!("/{}", joined),
            (false, _) => joined,
        };
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_absolute(&self) -> bool {
        self.0.starts_with('/')
    }

    /// Append one or more `/`-separated segments
    pub fn join(&self, segment: &str) -> RemotePath {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            return self.clone();
        }
        if self.0 == "/" {
            RemotePath(format!("/{}", segment))
        } else {
            RemotePath(format!("{}/{}", self.0, segment))
        }
    }

    /// Parent directory, or `None` for `/` and single relative segments
    pub fn parent(&self) -> Option<RemotePath> {
        let idx = self.0.rfind('/')?;
        match idx {
            0 if self.0.len() > 1 => Some(RemotePath("/".to_string())),
            0 => None,
            _ => Some(RemotePath(self.0[..idx].to_string())),
        }
    }

    /// Last path segment
    pub fn file_name(&self) -> Option<&str> {
        self.0.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Whether `self` equals `other` or lies below it
    pub fn starts_with(&self, other: &RemotePath) -> bool {
        if other.0 == "/" {
            return self.is_absolute();
        }
        self.0 == other.0
            || (self.0.starts_with(&other.0) && self.0[other.0.len()..].starts_with('/'))
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RemotePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RemotePath {
    type Error = RemotePathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RemotePath::new(value)
    }
}

impl TryFrom<&str> for RemotePath {
    type Error = RemotePathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        RemotePath::new(value)
    }
}

impl From<RemotePath> for String {
    fn from(path: RemotePath) -> Self {
        path.0
    }
}
