//! Common test utilities for rdeploy integration and CLI tests.
//!
//! This module provides:
//! - A fake `ssh` program that runs the remote script locally, so the real
//!   OpenSSH transport can be exercised without a server
//! - Helpers for building local trees and invoking the binary

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Accepts the control-master lifecycle and runs the last argument with `sh`
pub const FAKE_SSH: &str = r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    -M|-O) exit 0 ;;
  esac
done
for last in "$@"; do :; done
exec sh -c "$last"
"#;

/// Rejects every login the way OpenSSH does
pub const REJECTING_SSH: &str = r#"#!/bin/sh
echo "Warning: Permanently added 'deploy.example.test' (ED25519) to the list of known hosts." >&2
echo "deploy@deploy.example.test: Permission denied (publickey,password)." >&2
exit 255
"#;

pub fn install_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

pub fn install_fake_ssh(dir: &Path) -> PathBuf {
    install_script(dir, "fake-ssh", FAKE_SSH)
}

pub fn install_rejecting_ssh(dir: &Path) -> PathBuf {
    install_script(dir, "rejecting-ssh", REJECTING_SSH)
}

/// Create files (and their parent directories) under `root`
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

/// The binary, isolated from the caller's environment and lock directory
pub fn rdeploy(work: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rdeploy"));
    cmd.current_dir(work)
        .env("HOME", work)
        .env("XDG_CACHE_HOME", work.join("cache"))
        .env_remove("RDEPLOY_HOST")
        .env_remove("RDEPLOY_PORT")
        .env_remove("RDEPLOY_USER")
        .env_remove("RDEPLOY_SSH")
        .env_remove("RDEPLOY_PASSWORD");
    cmd
}

/// TOML string literal for a path
pub fn toml_path(path: &Path) -> String {
    format!("{:?}", path.to_str().unwrap())
}
