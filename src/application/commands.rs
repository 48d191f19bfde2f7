//! Command Runner
//!
//! Runs command batches one command at a time. Each command gets its own
//! timeout; the configured [`FailureClassifier`] decides whether a finished
//! command counts as failed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::entities::{CommandBatch, CommandSpec, StepError, StepKind, StepResult};
use crate::domain::policies::{ExitStatusOnly, FailureClassifier};
use crate::domain::ports::{CommandChannel, DeployEvent, SessionError};
use crate::domain::value_objects::CancellationToken;

use super::recorder::StepRecorder;

pub struct CommandRunner {
    classifier: Arc<dyn FailureClassifier>,
    cancel: CancellationToken,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner {
    pub fn new() -> Self {
        Self {
            classifier: Arc::new(ExitStatusOnly),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn FailureClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run commands in order, continuing past failures
    pub fn run<S>(&self, session: &S, commands: &[CommandSpec]) -> Vec<StepResult>
    where
        S: CommandChannel + ?Sized,
    {
        let batch = CommandBatch::new("commands", commands.to_vec());
        self.run_batch(session, &batch)
    }

    pub fn run_batch<S>(&self, session: &S, batch: &CommandBatch) -> Vec<StepResult>
    where
        S: CommandChannel + ?Sized,
    {
        let mut recorder = StepRecorder::silent();
        self.run_batch_into(session, batch, &mut recorder);
        recorder.into_steps()
    }

    /// Run a batch, recording one step per command actually started.
    ///
    /// Commands after a cancellation, or after a failure in a
    /// `stop_on_failure` batch, are not started and leave no step.
    pub fn run_batch_into<S>(&self, session: &S, batch: &CommandBatch, recorder: &mut StepRecorder)
    where
        S: CommandChannel + ?Sized,
    {
        for spec in &batch.commands {
            if self.cancel.is_cancelled() {
                break;
            }
            recorder.emit(DeployEvent::CommandStarted {
                command: spec.command_line.clone(),
            });

            let step = self.run_one(session, spec, batch.default_timeout);
            let failed = step.is_failure();
            let cancelled = step.is_cancelled();
            recorder.record(step);

            if cancelled || (failed && batch.stop_on_failure) {
                break;
            }
        }
    }

    fn run_one<S>(&self, session: &S, spec: &CommandSpec, default_timeout: Duration) -> StepResult
    where
        S: CommandChannel + ?Sized,
    {
        let started = Instant::now();
        let timeout = spec.effective_timeout(default_timeout);
        let target = spec.command_line.as_str();

        let step = match session.execute(&spec.effective_command(), timeout) {
            Ok(output) => {
                let step = match self.classifier.classify(&output) {
                    None => StepResult::new(StepKind::CommandOk, target),
                    Some(reason) => StepResult::failed(
                        StepKind::CommandFailed,
                        target,
                        StepError::CommandFailure {
                            status: output.status,
                            reason,
                        },
                    ),
                };
                step.with_output(output.stdout, output.stderr)
            }
            Err(SessionError::Timeout { after, .. }) => StepResult::failed(
                StepKind::CommandFailed,
                target,
                StepError::CommandTimeout {
                    after_secs: after.as_secs(),
                },
            ),
            Err(err) if err.is_cancelled() => {
                StepResult::failed(StepKind::CommandFailed, target, StepError::Cancelled)
            }
            Err(err) => StepResult::failed(
                StepKind::CommandFailed,
                target,
                StepError::CommandFailure {
                    status: None,
                    reason: err.to_string(),
                },
            ),
        };
        step.with_duration(started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{remote, MockSession};
    use crate::domain::policies::StrictStderr;
    use crate::domain::ports::CommandOutput;

    fn output(status: i32, stdout: &str, stderr: &str) -> Result<CommandOutput, SessionError> {
        Ok(CommandOutput {
            status: Some(status),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        })
    }

    #[test]
    fn runs_in_order_and_captures_output() {
        let session = MockSession::new();
        session.respond("node -v", output(0, "v20.11.0\n", ""));

        let steps = CommandRunner::new().run(
            &session,
            &[CommandSpec::new("node -v"), CommandSpec::new("npm -v")],
        );

        assert_eq!(session.executed(), vec!["node -v", "npm -v"]);
        assert_eq!(steps[0].kind, StepKind::CommandOk);
        assert_eq!(steps[0].stdout, "v20.11.0\n");
        assert_eq!(steps[1].target, "npm -v");
    }

    #[test]
    fn failure_does_not_stop_batch_by_default() {
        let session = MockSession::new();
        session.respond("false", output(1, "", "boom"));

        let steps = CommandRunner::new().run(
            &session,
            &[CommandSpec::new("false"), CommandSpec::new("true")],
        );

        assert_eq!(steps[0].kind, StepKind::CommandFailed);
        assert_eq!(steps[0].stderr, "boom");
        assert_eq!(steps[1].kind, StepKind::CommandOk);
    }

    #[test]
    fn stop_on_failure_skips_the_rest() {
        let session = MockSession::new();
        session.respond("false", output(1, "", ""));
        let batch = CommandBatch::new(
            "setup",
            vec![CommandSpec::new("false"), CommandSpec::new("true")],
        )
        .with_stop_on_failure(true);

        let steps = CommandRunner::new().run_batch(&session, &batch);

        assert_eq!(steps.len(), 1);
        assert_eq!(session.executed(), vec!["false"]);
    }

    #[test]
    fn working_dir_changes_command_sent_but_not_target() {
        let session = MockSession::new();
        let spec = CommandSpec::new("php artisan view:clear").with_working_dir(remote("/srv/app"));

        let steps = CommandRunner::new().run(&session, &[spec]);

        assert_eq!(
            session.executed(),
            vec!["cd '/srv/app' && php artisan view:clear"]
        );
        assert_eq!(steps[0].target, "php artisan view:clear");
    }

    #[test]
    fn timeout_becomes_command_timeout() {
        let session = MockSession::new();
        session.respond(
            "composer install",
            Err(SessionError::Timeout {
                operation: "composer install".to_string(),
                after: Duration::from_secs(600),
            }),
        );

        let steps = CommandRunner::new().run(&session, &[CommandSpec::new("composer install")]);

        assert_eq!(
            steps[0].error,
            Some(StepError::CommandTimeout { after_secs: 600 })
        );
    }

    #[test]
    fn stderr_with_zero_exit_is_ok_by_default() {
        let session = MockSession::new();
        session.respond("which nodejs", output(0, "", "which: no nodejs"));

        let steps = CommandRunner::new().run(&session, &[CommandSpec::new("which nodejs")]);
        assert_eq!(steps[0].kind, StepKind::CommandOk);
    }

    #[test]
    fn strict_classifier_fails_on_stderr() {
        let session = MockSession::new();
        session.respond("npm install", output(0, "", "npm ERR! missing script"));

        let steps = CommandRunner::new()
            .with_classifier(Arc::new(StrictStderr::default()))
            .run(&session, &[CommandSpec::new("npm install")]);

        assert_eq!(steps[0].kind, StepKind::CommandFailed);
    }

    #[test]
    fn cancellation_stops_the_batch() {
        let session = MockSession::new();
        session.respond(
            "sleep 100",
            Err(SessionError::Cancelled {
                operation: "sleep 100".to_string(),
            }),
        );

        let steps = CommandRunner::new().run(
            &session,
            &[CommandSpec::new("sleep 100"), CommandSpec::new("true")],
        );

        assert_eq!(steps.len(), 1);
        assert!(steps[0].is_cancelled());
    }

    #[test]
    fn cancelled_token_runs_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let session = MockSession::new();

        let steps = CommandRunner::new()
            .with_cancellation(cancel)
            .run(&session, &[CommandSpec::new("true")]);

        assert!(steps.is_empty());
        assert!(session.executed().is_empty());
    }
}
