//! Local deployment lock
//!
//! One deployment runs per host at a time. Each run takes an exclusive `fs2`
//! lock on `<cache>/rdeploy/locks/<sha256(host:port)>.lock`, whatever user it
//! logs in as and whatever paths it touches. The lock is released on drop.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use sha2::{Digest, Sha256};

use crate::error::LockError;

/// Held for the duration of a run
#[derive(Debug)]
pub struct DeployLock {
    file: File,
    path: PathBuf,
}

impl DeployLock {
    /// Lock under the user cache directory
    pub fn acquire(host: &str, port: u16) -> Result<Self, LockError> {
        let cache = dirs::cache_dir().ok_or(LockError::NoCacheDir)?;
        Self::acquire_in(&cache.join("rdeploy").join("locks"), host, port)
    }

    pub fn acquire_in(dir: &Path, host: &str, port: u16) -> Result<Self, LockError> {
        fs::create_dir_all(dir).map_err(|source| LockError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(format!("{}.lock", lock_key(host, port)));
        let file = File::create(&path).map_err(|source| LockError::Io {
            path: path.clone(),
            source,
        })?;
        if file.try_lock_exclusive().is_err() {
            return Err(LockError::Busy {
                target: format!("{}:{}", host, port),
                path,
            });
        }

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DeployLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Host names are case-insensitive
fn lock_key(host: &str, port: u16) -> String {
    let mut hasher = Sha256::new();
    hasher.update(host.trim().to_ascii_lowercase().as_bytes());
    hasher.update(b":");
    hasher.update(port.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}
