//! Scenario: command batches through the transport

use std::fs;
use std::path::Path;
use std::time::Duration;

use rdeploy::domain::policies::StderrPolicy;
use rdeploy::{
    ArtifactSpec, CommandBatch, CommandSpec, ConnectionConfig, Credential, DeployOptions,
    DeploymentOrchestrator, OpenSshConnector, RemotePath, StepError, StepKind,
};
use tempfile::tempdir;

use crate::common::install_fake_ssh;

fn config() -> ConnectionConfig {
    ConnectionConfig::new(
        "deploy.example.test",
        22,
        "deploy",
        Credential::IdentityFile("id_test".into()),
    )
    .unwrap()
}

fn orchestrator(work: &Path, options: DeployOptions) -> DeploymentOrchestrator<OpenSshConnector> {
    let connector = OpenSshConnector::new().with_program(install_fake_ssh(work));
    DeploymentOrchestrator::new(connector, options)
}

fn remote(path: &Path) -> RemotePath {
    RemotePath::new(path.to_str().unwrap()).unwrap()
}

#[test]
fn artifact_then_command_succeeds() {
    let work = tempdir().unwrap();
    let app = work.path().join("backend/app");
    fs::create_dir_all(&app).unwrap();
    let backend = remote(&work.path().join("backend"));

    let report = orchestrator(work.path(), DeployOptions::new()).deploy(
        &config(),
        vec![],
        vec![ArtifactSpec::new(remote(&app.join("X.php")), "<?php class X {}")],
        vec![CommandBatch::new(
            "cache",
            vec![CommandSpec::new("cat app/X.php").with_working_dir(backend)],
        )],
    );

    let kinds: Vec<StepKind> = report.steps().iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![StepKind::FileWritten, StepKind::CommandOk]);
    assert_eq!(report.steps()[1].stdout.trim(), "<?php class X {}");
    assert_eq!(report.steps()[1].target, "cat app/X.php");
    assert!(report.success());
}

#[test]
fn middle_failure_keeps_batch_running() {
    let work = tempdir().unwrap();
    let marker = work.path().join("third-ran");

    let report = orchestrator(work.path(), DeployOptions::new()).deploy(
        &config(),
        vec![],
        vec![],
        vec![CommandBatch::new(
            "maintenance",
            vec![
                CommandSpec::new("true"),
                CommandSpec::new("echo broken >&2; exit 3"),
                CommandSpec::new(format!("touch '{}'", marker.display())),
            ],
        )],
    );

    let kinds: Vec<StepKind> = report.command_steps().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![StepKind::CommandOk, StepKind::CommandFailed, StepKind::CommandOk]
    );
    match &report.steps()[1].error {
        Some(StepError::CommandFailure { status, .. }) => assert_eq!(*status, Some(3)),
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(report.steps()[1].stderr.trim(), "broken");
    assert!(marker.exists());
    assert!(!report.success());
}

#[test]
fn slow_command_times_out_and_next_runs() {
    let work = tempdir().unwrap();

    let report = orchestrator(work.path(), DeployOptions::new()).deploy(
        &config(),
        vec![],
        vec![],
        vec![CommandBatch::new(
            "setup",
            vec![
                CommandSpec::new("sleep 5").with_timeout(Duration::from_secs(1)),
                CommandSpec::new("echo after"),
            ],
        )],
    );

    let steps = report.steps();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].kind, StepKind::CommandFailed);
    assert_eq!(
        steps[0].error,
        Some(StepError::CommandTimeout { after_secs: 1 })
    );
    assert_eq!(steps[1].kind, StepKind::CommandOk);
    assert_eq!(steps[1].stdout.trim(), "after");
}

#[test]
fn stderr_only_fails_under_strict_policy() {
    let work = tempdir().unwrap();
    let batch = || {
        vec![CommandBatch::new(
            "tools",
            vec![
                CommandSpec::new("echo 'which: no node' >&2"),
                CommandSpec::new("echo 'deprecated option' >&2"),
            ],
        )]
    };

    let lenient = orchestrator(work.path(), DeployOptions::new())
        .deploy(&config(), vec![], vec![], batch());
    assert!(lenient.success());

    let strict = orchestrator(
        work.path(),
        DeployOptions::new()
            .with_stderr_policy(StderrPolicy::Strict, vec!["which: no".to_string()]),
    )
    .deploy(&config(), vec![], vec![], batch());
    let kinds: Vec<StepKind> = strict.command_steps().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![StepKind::CommandOk, StepKind::CommandFailed]);
    assert!(!strict.success());
}
