//! Artifact Writer
//!
//! Places generated files at explicit remote paths, creates the directories
//! they need, and removes files a previous deployment left behind.

use std::time::Instant;

use crate::domain::entities::{content_digest, ArtifactSpec, StepError, StepKind, StepResult};
use crate::domain::ports::FileChannel;
use crate::domain::value_objects::RemotePath;

use super::sync::create_remote_dir;

#[derive(Debug, Default, Clone, Copy)]
pub struct ArtifactWriter;

impl ArtifactWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write one artifact, replacing any existing content at its path
    pub fn write<S>(&self, session: &S, spec: &ArtifactSpec) -> StepResult
    where
        S: FileChannel + ?Sized,
    {
        let started = Instant::now();
        let bytes = spec.content.as_bytes();
        let step = match session.write_file(&spec.remote_path, bytes) {
            Ok(()) => StepResult::new(StepKind::FileWritten, spec.remote_path.as_str())
                .with_payload(bytes.len() as u64, content_digest(bytes)),
            Err(err) if err.is_cancelled() => StepResult::failed(
                StepKind::TransferFailed,
                spec.remote_path.as_str(),
                StepError::Cancelled,
            ),
            Err(err) => StepResult::failed(
                StepKind::TransferFailed,
                spec.remote_path.as_str(),
                StepError::Transfer {
                    message: err.to_string(),
                },
            ),
        };
        step.with_duration(started.elapsed())
    }

    /// Create each directory in order, one level at a time.
    ///
    /// Parents are not created implicitly; list them before their children.
    pub fn ensure_dirs<S>(&self, session: &S, dirs: &[RemotePath]) -> Vec<StepResult>
    where
        S: FileChannel + ?Sized,
    {
        dirs.iter()
            .map(|dir| create_remote_dir(session, dir))
            .collect()
    }

    /// Remove an obsolete remote file. A missing file counts as removed.
    pub fn remove<S>(&self, session: &S, path: &RemotePath) -> StepResult
    where
        S: FileChannel + ?Sized,
    {
        let started = Instant::now();
        let step = match session.remove_file(path) {
            Ok(()) => StepResult::new(StepKind::FileRemoved, path.as_str()),
            Err(err) if err.is_cancelled() => {
                StepResult::failed(StepKind::TransferFailed, path.as_str(), StepError::Cancelled)
            }
            Err(err) => StepResult::failed(
                StepKind::TransferFailed,
                path.as_str(),
                StepError::Transfer {
                    message: err.to_string(),
                },
            ),
        };
        step.with_duration(started.elapsed())
    }
}
