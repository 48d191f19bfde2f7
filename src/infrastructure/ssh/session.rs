//! OpenSSH session
//!
//! One run holds one authenticated connection: a control master started by
//! [`OpenSshConnector::open`]. Every file and command operation is a short
//! `ssh -S <socket>` invocation multiplexed over that master, so the
//! password is sent once and no operation pays for a new handshake.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use crate::domain::entities::shell_quote;
use crate::domain::ports::{
    CommandChannel, CommandOutput, ConnectionError, FileChannel, RemoteSession, SessionConnector,
    SessionError,
};
use crate::domain::value_objects::{
    CancellationToken, ConnectionConfig, Credential, HostKeyPolicy, RemotePath,
};

use super::askpass;
use super::process::{self, Captured, Outcome};

/// Budget for a single file operation when none is configured
pub const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_secs(120);

/// Extra time allowed on top of `ConnectTimeout` for authentication
const CONNECT_GRACE: Duration = Duration::from_secs(10);

const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Exit status the mkdir script uses for "already a directory"
const EXIT_DIR_EXISTS: i32 = 73;

/// Exit status of the ssh client itself failing
const EXIT_SSH_ERROR: i32 = 255;

/// Opens [`OpenSshSession`]s with the system `ssh` client
#[derive(Debug, Clone)]
pub struct OpenSshConnector {
    program: PathBuf,
    transfer_timeout: Duration,
    cancel: CancellationToken,
}

impl Default for OpenSshConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenSshConnector {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ssh"),
            transfer_timeout: DEFAULT_TRANSFER_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    /// Use a different client binary (tests substitute a fake `ssh`)
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_transfer_timeout(mut self, timeout: Duration) -> Self {
        self.transfer_timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn master_command(
        &self,
        config: &ConnectionConfig,
        control_path: &Path,
        workdir: &Path,
    ) -> io::Result<Command> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-M")
            .arg("-N")
            .arg("-f")
            .arg("-S")
            .arg(control_path)
            .arg("-o")
            .arg("ControlPersist=yes")
            .arg("-o")
            .arg("ServerAliveInterval=15")
            .args(connect_options(config));

        match config.credential() {
            Credential::Password(secret) => {
                let helper = askpass::install(workdir)?;
                cmd.arg("-o")
                    .arg("PreferredAuthentications=password,keyboard-interactive")
                    .arg("-o")
                    .arg("PubkeyAuthentication=no")
                    .arg("-o")
                    .arg("NumberOfPasswordPrompts=1");
                askpass::configure(&mut cmd, &helper, secret);
            }
            Credential::IdentityFile(_) => {
                cmd.arg("-o").arg("BatchMode=yes");
            }
        }

        cmd.arg("-p")
            .arg(config.port().to_string())
            .arg("-l")
            .arg(config.username())
            .arg(config.host());
        Ok(cmd)
    }
}

impl SessionConnector for OpenSshConnector {
    type Session = OpenSshSession;

    fn open(&self, config: &ConnectionConfig) -> Result<OpenSshSession, ConnectionError> {
        let target = config.display_target();
        let transport = |err: io::Error| ConnectionError::Transport(err.to_string());

        let workdir = tempfile::Builder::new()
            .prefix("rdeploy-")
            .tempdir()
            .map_err(transport)?;
        let control_path = workdir.path().join("control");
        let log_path = workdir.path().join("master.log");

        let mut cmd = self
            .master_command(config, &control_path, workdir.path())
            .map_err(transport)?;
        // The master forks into the background and keeps whatever stdio it
        // was given, so its stderr goes to a file instead of a pipe.
        let log = std::fs::File::create(&log_path).map_err(transport)?;
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log));

        let mut child = cmd.spawn().map_err(|err| {
            ConnectionError::Transport(format!("cannot run {}: {}", self.program.display(), err))
        })?;

        let budget = config.connect_timeout() + CONNECT_GRACE;
        let status = match process::wait_with_deadline(
            &mut child,
            Some(Instant::now() + budget),
            &self.cancel,
        )
        .map_err(transport)?
        {
            Outcome::Finished(status) => status,
            Outcome::TimedOut => {
                return Err(ConnectionError::Timeout {
                    target,
                    after_secs: config.connect_timeout().as_secs(),
                })
            }
            Outcome::Cancelled => return Err(ConnectionError::Cancelled),
        };

        if !status.success() {
            let log = std::fs::read_to_string(&log_path).unwrap_or_default();
            return Err(classify_open_failure(target, config, &log));
        }

        Ok(OpenSshSession {
            program: self.program.clone(),
            control_path,
            host: config.host().to_string(),
            port: config.port(),
            username: config.username().to_string(),
            target,
            connect_options: connect_options(config),
            transfer_timeout: self.transfer_timeout,
            cancel: self.cancel.clone(),
            master_lost: AtomicBool::new(false),
            workdir: Some(workdir),
        })
    }
}

/// Options any connection to the host must carry, including the direct
/// connection ssh falls back to when the control socket is gone
fn connect_options(config: &ConnectionConfig) -> Vec<OsString> {
    let mut options: Vec<OsString> = vec![
        "-o".into(),
        format!("ConnectTimeout={}", config.connect_timeout().as_secs().max(1)).into(),
    ];
    for option in host_key_options(config.host_key_policy()) {
        options.push("-o".into());
        options.push(option.into());
    }
    if let Credential::IdentityFile(path) = config.credential() {
        options.push("-i".into());
        options.push(path.into());
        options.push("-o".into());
        options.push("IdentitiesOnly=yes".into());
    }
    options
}

fn host_key_options(policy: HostKeyPolicy) -> Vec<&'static str> {
    match policy {
        HostKeyPolicy::Strict => vec!["StrictHostKeyChecking=yes"],
        HostKeyPolicy::AcceptNew => vec!["StrictHostKeyChecking=accept-new"],
        HostKeyPolicy::AcceptAny => vec![
            "StrictHostKeyChecking=no",
            "UserKnownHostsFile=/dev/null",
        ],
    }
}

fn classify_open_failure(target: String, config: &ConnectionConfig, log: &str) -> ConnectionError {
    let message = last_meaningful_line(log);
    let lower = log.to_ascii_lowercase();
    if lower.contains("permission denied")
        || lower.contains("authentication failed")
        || lower.contains("host key verification failed")
    {
        ConnectionError::AuthenticationFailed { target, message }
    } else if lower.contains("timed out") {
        ConnectionError::Timeout {
            target,
            after_secs: config.connect_timeout().as_secs(),
        }
    } else {
        ConnectionError::Unreachable { target, message }
    }
}

fn last_meaningful_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("Warning: Permanently added"))
        .last()
        .unwrap_or("ssh exited without a message")
        .to_string()
}

/// An open control master plus what is needed to talk through it
pub struct OpenSshSession {
    program: PathBuf,
    control_path: PathBuf,
    host: String,
    port: u16,
    username: String,
    target: String,
    connect_options: Vec<OsString>,
    transfer_timeout: Duration,
    cancel: CancellationToken,
    /// Set once the control master is found dead; later operations fail fast
    master_lost: AtomicBool,
    /// Holds the control socket and askpass helper; `None` once closed
    workdir: Option<TempDir>,
}

impl OpenSshSession {
    fn ssh(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-S")
            .arg(&self.control_path)
            .arg("-o")
            .arg("ControlMaster=no")
            .arg("-o")
            .arg("BatchMode=yes")
            .args(&self.connect_options)
            .arg("-p")
            .arg(self.port.to_string())
            .arg("-l")
            .arg(&self.username);
        cmd
    }

    /// Send a control command (`check`, `exit`) to the master
    fn control(&self, command: &str) -> bool {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-S")
            .arg(&self.control_path)
            .arg("-O")
            .arg(command)
            .arg(&self.host)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        let Ok(mut child) = cmd.spawn() else {
            return false;
        };
        matches!(
            process::wait_with_deadline(
                &mut child,
                Some(Instant::now() + CLOSE_TIMEOUT),
                &CancellationToken::new(),
            ),
            Ok(Outcome::Finished(status)) if status.success()
        )
    }

    /// Run `script` through the master and collect its output
    fn run(
        &self,
        operation: &str,
        script: &str,
        input: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<Captured, SessionError> {
        if self.workdir.is_none() {
            return Err(SessionError::Closed);
        }
        if self.cancel.is_cancelled() {
            return Err(SessionError::Cancelled {
                operation: operation.to_string(),
            });
        }
        if self.master_lost.load(Ordering::SeqCst) {
            return Err(SessionError::Disconnected(format!(
                "control master for {} is no longer running",
                self.target
            )));
        }

        let mut cmd = self.ssh();
        cmd.arg(&self.host).arg(script);

        match process::run_captured(cmd, input, timeout, &self.cancel) {
            Ok(Outcome::Finished(captured)) => {
                if captured.status == Some(EXIT_SSH_ERROR) && !self.control("check") {
                    self.master_lost.store(true, Ordering::SeqCst);
                    return Err(SessionError::Disconnected(last_meaningful_line(
                        &captured.stderr_lossy(),
                    )));
                }
                Ok(captured)
            }
            Ok(Outcome::TimedOut) => Err(SessionError::Timeout {
                operation: operation.to_string(),
                after: timeout,
            }),
            Ok(Outcome::Cancelled) => Err(SessionError::Cancelled {
                operation: operation.to_string(),
            }),
            Err(err) => Err(SessionError::Disconnected(format!(
                "cannot run {}: {}",
                self.program.display(),
                err
            ))),
        }
    }

    /// Run a file operation within the transfer budget
    fn file_op(
        &self,
        operation: &str,
        path: &RemotePath,
        script: &str,
        input: Option<&[u8]>,
    ) -> Result<Captured, SessionError> {
        self.run(
            &format!("{} {}", operation, path),
            script,
            input,
            self.transfer_timeout,
        )
    }
}

/// Anything but exit 0 is an error
fn check_status(operation: &str, captured: &Captured) -> Result<(), SessionError> {
    match captured.status {
        Some(0) => Ok(()),
        Some(EXIT_SSH_ERROR) => Err(SessionError::Disconnected(last_meaningful_line(
            &captured.stderr_lossy(),
        ))),
        status => Err(SessionError::Remote {
            operation: operation.to_string(),
            status,
            message: last_meaningful_line(&captured.stderr_lossy()),
        }),
    }
}

impl FileChannel for OpenSshSession {
    fn create_dir(&self, path: &RemotePath) -> Result<(), SessionError> {
        let quoted = shell_quote(path.as_str());
        let script = format!(
            "if [ -d {q} ]; then exit {code}; fi; mkdir {q}",
            q = quoted,
            code = EXIT_DIR_EXISTS
        );
        let captured = self.file_op("mkdir", path, &script, None)?;
        if captured.status == Some(EXIT_DIR_EXISTS) {
            return Err(SessionError::DirectoryExists(path.clone()));
        }
        check_status("mkdir", &captured)
    }

    fn write_file(&self, path: &RemotePath, contents: &[u8]) -> Result<(), SessionError> {
        let script = format!("cat > {}", shell_quote(path.as_str()));
        let captured = self.file_op("write", path, &script, Some(contents))?;
        check_status("write", &captured)
    }

    fn remove_file(&self, path: &RemotePath) -> Result<(), SessionError> {
        let script = format!("rm -f {}", shell_quote(path.as_str()));
        let captured = self.file_op("remove", path, &script, None)?;
        check_status("remove", &captured)
    }
}

impl CommandChannel for OpenSshSession {
    fn execute(&self, command: &str, timeout: Duration) -> Result<CommandOutput, SessionError> {
        let captured = self.run(command, command, None, timeout)?;
        Ok(CommandOutput {
            status: captured.status,
            stdout: captured.stdout_lossy(),
            stderr: captured.stderr_lossy(),
        })
    }
}

impl RemoteSession for OpenSshSession {
    fn target(&self) -> String {
        self.target.clone()
    }

    fn is_open(&self) -> bool {
        self.workdir.is_some()
    }

    fn close(&mut self) {
        let Some(workdir) = self.workdir.take() else {
            return;
        };
        self.control("exit");
        drop(workdir);
    }
}

impl Drop for OpenSshSession {
    fn drop(&mut self) {
        self.close();
    }
}
