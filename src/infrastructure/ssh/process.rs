//! Child process supervision
//!
//! Runs `ssh` invocations with a deadline and a cancellation token. Output
//! pipes are drained on helper threads so a chatty command cannot fill a
//! pipe buffer and stall.

use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::domain::value_objects::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Output of a process that ran to completion
#[derive(Debug, Default)]
pub struct Captured {
    /// `None` when terminated by a signal
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Captured {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

#[derive(Debug)]
pub enum Outcome<T> {
    Finished(T),
    TimedOut,
    Cancelled,
}

/// Poll `child` until it exits, the deadline passes, or `cancel` fires.
/// A child that does not exit is killed and reaped.
pub fn wait_with_deadline(
    child: &mut Child,
    deadline: Option<Instant>,
    cancel: &CancellationToken,
) -> io::Result<Outcome<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Outcome::Finished(status));
        }
        if cancel.is_cancelled() {
            kill(child);
            return Ok(Outcome::Cancelled);
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            kill(child);
            return Ok(Outcome::TimedOut);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Spawn `command`, feed it `input`, and capture stdout and stderr
pub fn run_captured(
    mut command: Command,
    input: Option<&[u8]>,
    timeout: Duration,
    cancel: &CancellationToken,
) -> io::Result<Outcome<Captured>> {
    command
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let deadline = Instant::now() + timeout;
    let mut child = command.spawn()?;

    let writer = match (child.stdin.take(), input) {
        (Some(mut stdin), Some(data)) => {
            let data = data.to_vec();
            Some(thread::spawn(move || -> io::Result<()> {
                match stdin.write_all(&data) {
                    // the remote side may exit without reading everything
                    Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                    other => other,
                }
            }))
        }
        _ => None,
    };
    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    let status = match wait_with_deadline(&mut child, Some(deadline), cancel)? {
        Outcome::Finished(status) => status,
        // Readers are left behind: a grandchild may still hold the pipes.
        Outcome::TimedOut => return Ok(Outcome::TimedOut),
        Outcome::Cancelled => return Ok(Outcome::Cancelled),
    };

    let captured = Captured {
        status: status.code(),
        stdout: join_reader(stdout),
        stderr: join_reader(stderr),
    };
    if let Some(writer) = writer {
        if let Ok(Err(err)) = writer.join() {
            return Err(err);
        }
    }
    Ok(Outcome::Finished(captured))
}

fn spawn_reader<R>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
