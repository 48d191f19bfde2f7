//! Deploy Use Case
//!
//! Runs a deployment in fixed stage order:
//! 1. Open the session
//! 2. Sync each local tree
//! 3. Create required directories
//! 4. Write artifacts
//! 5. Remove obsolete files
//! 6. Run command batches
//! 7. Close the session
//!
//! Stage failures never abort the run; they end up as steps in the report.
//! Only a connection failure or cancellation stops it early, and the session
//! is closed whenever it was opened.

use std::sync::Arc;

use crate::application::artifact::ArtifactWriter;
use crate::application::commands::CommandRunner;
use crate::application::recorder::StepRecorder;
use crate::application::sync::{create_remote_dir, PathSynchronizer};
use crate::domain::entities::{
    ArtifactSpec, CommandBatch, DeploymentPlan, DeploymentReport, ReportBuilder, SyncSpec,
};
use crate::domain::ports::{
    ConnectionError, DeployEvent, DeployEventSink, NoopEventSink, RemoteSession,
    SessionConnector, Stage,
};
use crate::domain::value_objects::ConnectionConfig;

use super::options::DeployOptions;

/// Deploy use case - one session, one report
///
/// Parameterized by the connector so tests can substitute an in-memory
/// session for the OpenSSH transport.
pub struct DeploymentOrchestrator<C>
where
    C: SessionConnector,
{
    connector: C,
    options: DeployOptions,
    events: Arc<dyn DeployEventSink>,
}

impl<C> DeploymentOrchestrator<C>
where
    C: SessionConnector,
{
    pub fn new(connector: C, options: DeployOptions) -> Self {
        Self {
            connector,
            options,
            events: Arc::new(NoopEventSink),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn options(&self) -> &DeployOptions {
        &self.options
    }

    /// Deploy syncs, artifacts and batches with no extra directories or removals
    pub fn deploy(
        &self,
        config: &ConnectionConfig,
        syncs: Vec<SyncSpec>,
        artifacts: Vec<ArtifactSpec>,
        batches: Vec<CommandBatch>,
    ) -> DeploymentReport {
        let plan = DeploymentPlan {
            syncs,
            artifacts,
            batches,
            ..DeploymentPlan::default()
        };
        self.deploy_plan(config, &plan)
    }

    pub fn deploy_plan(&self, config: &ConnectionConfig, plan: &DeploymentPlan) -> DeploymentReport {
        let target = config.display_target();
        let mut report = ReportBuilder::new(&target);

        self.events.on_event(DeployEvent::Connecting {
            target: target.clone(),
        });

        let opened = if self.options.cancel.is_cancelled() {
            Err(ConnectionError::Cancelled)
        } else {
            self.connector.open(config)
        };

        let mut session = match opened {
            Ok(session) => session,
            Err(err) => {
                self.events.on_event(DeployEvent::ConnectionFailed {
                    target,
                    error: err.to_string(),
                });
                report.connection_failed(err.to_string());
                if matches!(err, ConnectionError::Cancelled) {
                    report.cancelled();
                    self.events.on_event(DeployEvent::Cancelled);
                }
                return self.complete(report);
            }
        };

        report.connected();
        self.events.on_event(DeployEvent::Connected {
            target: target.clone(),
        });

        self.run_stages(&session, plan, &mut report);

        session.close();
        self.events.on_event(DeployEvent::Disconnected { target });

        if self.options.cancel.is_cancelled() {
            report.cancelled();
            self.events.on_event(DeployEvent::Cancelled);
        }
        self.complete(report)
    }

    fn complete(&self, report: ReportBuilder) -> DeploymentReport {
        let report = report.finish();
        self.events.on_event(DeployEvent::Completed {
            success: report.success(),
            steps: report.steps().len(),
            failures: report.failed_steps().count(),
        });
        report
    }

    fn run_stages<S>(&self, session: &S, plan: &DeploymentPlan, report: &mut ReportBuilder)
    where
        S: RemoteSession,
    {
        let cancel = &self.options.cancel;

        let synchronizer = PathSynchronizer::new()
            .with_policy(self.options.transfer_policy)
            .with_cancellation(cancel.clone());
        self.stage(report, Stage::Sync, plan.syncs.len(), |recorder| {
            for spec in &plan.syncs {
                if cancel.is_cancelled() {
                    return;
                }
                recorder.emit(DeployEvent::SyncStarted {
                    local: spec.local_root.clone(),
                    remote: spec.remote_root.to_string(),
                });
                synchronizer.sync_into(session, spec, recorder);
            }
        });

        self.stage(report, Stage::EnsureDirs, plan.ensure_dirs.len(), |recorder| {
            for dir in &plan.ensure_dirs {
                if cancel.is_cancelled() {
                    return;
                }
                recorder.record(create_remote_dir(session, dir));
            }
        });

        let writer = ArtifactWriter::new();
        self.stage(report, Stage::Artifacts, plan.artifacts.len(), |recorder| {
            for spec in &plan.artifacts {
                if cancel.is_cancelled() {
                    return;
                }
                recorder.record(writer.write(session, spec));
            }
        });

        self.stage(report, Stage::Removals, plan.removals.len(), |recorder| {
            for path in &plan.removals {
                if cancel.is_cancelled() {
                    return;
                }
                recorder.record(writer.remove(session, path));
            }
        });

        let runner = CommandRunner::new()
            .with_classifier(Arc::clone(&self.options.classifier))
            .with_cancellation(cancel.clone());
        self.stage(report, Stage::Commands, plan.command_count(), |recorder| {
            for batch in &plan.batches {
                if cancel.is_cancelled() {
                    return;
                }
                recorder.emit(DeployEvent::BatchStarted {
                    name: batch.name.clone(),
                    commands: batch.commands.len(),
                });
                runner.run_batch_into(session, batch, recorder);
            }
        });
    }

    /// Run one stage if it has inputs and the run is still live
    fn stage<F>(&self, report: &mut ReportBuilder, stage: Stage, count: usize, body: F)
    where
        F: FnOnce(&mut StepRecorder),
    {
        if count == 0 || self.options.cancel.is_cancelled() {
            return;
        }
        self.events
            .on_event(DeployEvent::StageStarted { stage, count });
        let mut recorder = StepRecorder::new(Arc::clone(&self.events), report.step_count());
        body(&mut recorder);
        report.extend(recorder.into_steps());
    }
}
