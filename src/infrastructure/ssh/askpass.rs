//! SSH_ASKPASS helper
//!
//! OpenSSH only reads passwords from a terminal or an askpass program. The
//! helper written here prints the secret from an environment variable that
//! is set on the control master process alone, so the password never
//! appears on a command line or on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::domain::value_objects::Secret;

/// Environment variable the helper script reads
pub const SECRET_ENV: &str = "RDEPLOY_ASKPASS_SECRET";

const SCRIPT: &str = "#!/bin/sh\nprintf '%s\\n' \"$RDEPLOY_ASKPASS_SECRET\"\n";

/// Write the helper into `dir` and return its path
pub fn install(dir: &Path) -> io::Result<PathBuf> {
    let path = dir.join("askpass.sh");
    fs::write(&path, SCRIPT)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o700))?;
    }
    Ok(path)
}

/// Point `command` at the helper and hand it the secret
pub fn configure(command: &mut Command, helper: &Path, secret: &Secret) {
    command
        .env("SSH_ASKPASS", helper)
        .env("SSH_ASKPASS_REQUIRE", "force")
        .env(SECRET_ENV, secret.expose());
    // older clients only consult SSH_ASKPASS when DISPLAY is set
    if std::env::var_os("DISPLAY").is_none() {
        command.env("DISPLAY", "rdeploy:0");
    }
}
