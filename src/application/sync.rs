//! Path Synchronizer
//!
//! Mirrors a local directory tree onto the remote host through a
//! [`FileChannel`]. Directories are created before anything inside them,
//! entries are visited in name order, and excluded names are pruned with
//! their whole subtree.
//!
//! Individual failures become step results; the walk only stops early on
//! cancellation, on the sync budget running out, or (under
//! [`TransferFailurePolicy::AbortSubtree`]) for the rest of one directory.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::domain::entities::{content_digest, StepError, StepKind, StepResult, SyncSpec};
use crate::domain::policies::TransferFailurePolicy;
use crate::domain::ports::{FileChannel, SessionError};
use crate::domain::value_objects::{CancellationToken, RemotePath};

use super::recorder::StepRecorder;

pub struct PathSynchronizer {
    policy: TransferFailurePolicy,
    cancel: CancellationToken,
}

impl Default for PathSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PathSynchronizer {
    pub fn new() -> Self {
        Self {
            policy: TransferFailurePolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_policy(mut self, policy: TransferFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Mirror `spec.local_root` onto `spec.remote_root`
    pub fn sync<S>(&self, session: &S, spec: &SyncSpec) -> Vec<StepResult>
    where
        S: FileChannel + ?Sized,
    {
        let mut recorder = StepRecorder::silent();
        self.sync_into(session, spec, &mut recorder);
        recorder.into_steps()
    }

    /// Same as [`sync`](Self::sync), recording steps as they happen
    pub fn sync_into<S>(&self, session: &S, spec: &SyncSpec, recorder: &mut StepRecorder)
    where
        S: FileChannel + ?Sized,
    {
        if !spec.local_root.is_dir() {
            recorder.record(StepResult::failed(
                StepKind::TransferFailed,
                spec.remote_root.as_str(),
                StepError::Transfer {
                    message: format!(
                        "local root {} is not a directory",
                        spec.local_root.display()
                    ),
                },
            ));
            return;
        }

        let mut walk = Walk {
            session,
            spec,
            policy: self.policy,
            cancel: &self.cancel,
            recorder,
            deadline: spec.timeout.map(|budget| (Instant::now() + budget, budget)),
        };

        match walk.create_dir(&spec.remote_root) {
            DirOutcome::Ready => {
                walk.visit(&spec.local_root, &spec.remote_root);
            }
            DirOutcome::Failed | DirOutcome::Stop => {}
        }
    }
}

/// Create one remote directory, treating "already exists" as success
pub(crate) fn create_remote_dir<S>(session: &S, path: &RemotePath) -> StepResult
where
    S: FileChannel + ?Sized,
{
    let started = Instant::now();
    let step = match session.create_dir(path) {
        Ok(()) => StepResult::new(StepKind::DirCreated, path.as_str()),
        Err(SessionError::DirectoryExists(_)) => {
            StepResult::new(StepKind::DirSkippedExists, path.as_str())
        }
        Err(err) if err.is_cancelled() => {
            StepResult::failed(StepKind::DirFailed, path.as_str(), StepError::Cancelled)
        }
        Err(err) => StepResult::failed(
            StepKind::DirFailed,
            path.as_str(),
            StepError::Directory {
                message: err.to_string(),
            },
        ),
    };
    step.with_duration(started.elapsed())
}

enum Flow {
    Continue,
    Stop,
}

enum DirOutcome {
    Ready,
    Failed,
    Stop,
}

enum FileOutcome {
    Written,
    Failed,
    Stop,
}

enum EntryType {
    Dir,
    File,
    Other,
}

struct Walk<'a, S: ?Sized> {
    session: &'a S,
    spec: &'a SyncSpec,
    policy: TransferFailurePolicy,
    cancel: &'a CancellationToken,
    recorder: &'a mut StepRecorder,
    deadline: Option<(Instant, Duration)>,
}

impl<S> Walk<'_, S>
where
    S: FileChannel + ?Sized,
{
    fn visit(&mut self, local_dir: &Path, remote_dir: &RemotePath) -> Flow {
        let entries = match read_sorted(local_dir) {
            Ok(entries) => entries,
            Err(err) => {
                self.transfer_failed(
                    remote_dir.as_str(),
                    format!("cannot read {}: {}", local_dir.display(), err),
                );
                return Flow::Continue;
            }
        };

        for entry in entries {
            if let Flow::Stop = self.check_budget(remote_dir) {
                return Flow::Stop;
            }

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                self.transfer_failed(
                    &format!("{}/{}", remote_dir, file_name.to_string_lossy()),
                    "file name is not valid UTF-8".to_string(),
                );
                continue;
            };
            if self.spec.exclusions.matches(name) {
                continue;
            }

            let local = entry.path();
            let remote = remote_dir.join(name);
            match entry_type(&entry) {
                EntryType::Dir => match self.create_dir(&remote) {
                    DirOutcome::Ready => {
                        if let Flow::Stop = self.visit(&local, &remote) {
                            return Flow::Stop;
                        }
                    }
                    DirOutcome::Failed => {}
                    DirOutcome::Stop => return Flow::Stop,
                },
                EntryType::File => match self.upload(&local, &remote) {
                    FileOutcome::Written => {}
                    FileOutcome::Failed => {
                        if self.policy == TransferFailurePolicy::AbortSubtree {
                            return Flow::Continue;
                        }
                    }
                    FileOutcome::Stop => return Flow::Stop,
                },
                EntryType::Other => {}
            }
        }
        Flow::Continue
    }

    fn create_dir(&mut self, path: &RemotePath) -> DirOutcome {
        let step = create_remote_dir(self.session, path);
        let outcome = if step.is_cancelled() {
            DirOutcome::Stop
        } else if step.is_failure() {
            DirOutcome::Failed
        } else {
            DirOutcome::Ready
        };
        self.recorder.record(step);
        outcome
    }

    fn upload(&mut self, local: &Path, remote: &RemotePath) -> FileOutcome {
        let started = Instant::now();
        let contents = match fs::read(local) {
            Ok(contents) => contents,
            Err(err) => {
                self.transfer_failed(
                    remote.as_str(),
                    format!("cannot read {}: {}", local.display(), err),
                );
                return FileOutcome::Failed;
            }
        };

        match self.session.write_file(remote, &contents) {
            Ok(()) => {
                self.recorder.record(
                    StepResult::new(StepKind::FileWritten, remote.as_str())
                        .with_payload(contents.len() as u64, content_digest(&contents))
                        .with_duration(started.elapsed()),
                );
                FileOutcome::Written
            }
            Err(err) if err.is_cancelled() => {
                self.recorder.record(StepResult::failed(
                    StepKind::TransferFailed,
                    remote.as_str(),
                    StepError::Cancelled,
                ));
                FileOutcome::Stop
            }
            Err(err) => {
                self.recorder.record(
                    StepResult::failed(
                        StepKind::TransferFailed,
                        remote.as_str(),
                        StepError::Transfer {
                            message: err.to_string(),
                        },
                    )
                    .with_duration(started.elapsed()),
                );
                FileOutcome::Failed
            }
        }
    }

    fn check_budget(&mut self, remote_dir: &RemotePath) -> Flow {
        if self.cancel.is_cancelled() {
            return Flow::Stop;
        }
        if let Some((deadline, budget)) = self.deadline {
            if Instant::now() >= deadline {
                self.transfer_failed(
                    remote_dir.as_str(),
                    format!("sync exceeded its {}s time budget", budget.as_secs()),
                );
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    fn transfer_failed(&mut self, target: &str, message: String) {
        self.recorder.record(StepResult::failed(
            StepKind::TransferFailed,
            target,
            StepError::Transfer { message },
        ));
    }
}

fn read_sorted(dir: &Path) -> std::io::Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}

/// Symlinked files are followed; symlinked directories are not
fn entry_type(entry: &fs::DirEntry) -> EntryType {
    let Ok(file_type) = entry.file_type() else {
        return EntryType::File;
    };
    if file_type.is_dir() {
        EntryType::Dir
    } else if file_type.is_file() {
        EntryType::File
    } else if file_type.is_symlink() {
        match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_dir() => EntryType::Other,
            Ok(meta) if !meta.is_file() => EntryType::Other,
            // broken links fall through to the read error
            _ => EntryType::File,
        }
    } else {
        EntryType::Other
    }
}
