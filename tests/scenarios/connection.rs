//! Scenario: connection failures short-circuit the run

use std::fs;
use std::path::Path;

use rdeploy::domain::ports::{FileChannel, SessionError};

use rdeploy::{
    ArtifactSpec, CommandBatch, CommandSpec, ConnectionConfig, Credential, DeployOptions,
    DeploymentOrchestrator, OpenSshConnector, RemotePath, Secret, SessionConnector,
};
use tempfile::tempdir;

use crate::common::{install_rejecting_ssh, install_script};

fn password_config() -> ConnectionConfig {
    ConnectionConfig::new(
        "deploy.example.test",
        22,
        "deploy",
        Credential::Password(Secret::new("not-a-real-secret")),
    )
    .unwrap()
}

fn plan_for(work: &Path) -> (Vec<ArtifactSpec>, Vec<CommandBatch>) {
    let marker = work.join("ran");
    (
        vec![ArtifactSpec::new(
            RemotePath::new(work.join("a.txt").to_str().unwrap()).unwrap(),
            "a",
        )],
        vec![CommandBatch::new(
            "b",
            vec![CommandSpec::new(format!("touch '{}'", marker.display()))],
        )],
    )
}

#[test]
fn rejected_login_yields_empty_failed_report() {
    let work = tempdir().unwrap();
    let connector = OpenSshConnector::new().with_program(install_rejecting_ssh(work.path()));
    let (artifacts, batches) = plan_for(work.path());

    let report = DeploymentOrchestrator::new(connector, DeployOptions::new()).deploy(
        &password_config(),
        vec![],
        artifacts,
        batches,
    );

    assert!(!report.success());
    assert!(!report.connected());
    assert!(report.steps().is_empty());
    let error = report.connection_error().unwrap();
    assert!(error.contains("authentication failed"), "{error}");
    assert!(error.contains("Permission denied"), "{error}");
    assert!(!error.contains("not-a-real-secret"));
    assert!(!work.path().join("a.txt").exists());
    assert!(!work.path().join("ran").exists());
}

#[test]
fn missing_ssh_program_is_a_transport_error() {
    let work = tempdir().unwrap();
    let connector = OpenSshConnector::new().with_program(work.path().join("no-such-ssh"));

    let err = connector.open(&password_config()).err().unwrap();
    assert!(err.to_string().contains("cannot start transport"), "{err}");
}

/// Logs every invocation to `log`; the master starts but is gone afterwards
fn dead_master_ssh(log: &Path) -> String {
    format!(
        r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    -M) exit 0 ;;
  esac
done
echo "$*" >> '{}'
echo "ssh: connect to host deploy.example.test port 22: Connection refused" >&2
exit 255
"#,
        log.display()
    )
}

#[test]
fn lost_control_master_fails_fast_instead_of_reconnecting() {
    let work = tempdir().unwrap();
    let log = work.path().join("ssh.log");
    let ssh = install_script(work.path(), "dead-master-ssh", &dead_master_ssh(&log));
    let connector = OpenSshConnector::new().with_program(ssh);
    let session = connector.open(&password_config()).unwrap();

    let first = RemotePath::new(work.path().join("a.txt").to_str().unwrap()).unwrap();
    let second = RemotePath::new(work.path().join("b.txt").to_str().unwrap()).unwrap();
    let err = session.write_file(&first, b"a").unwrap_err();
    assert!(err.to_string().contains("Connection refused"), "{err}");
    let err = session.write_file(&second, b"b").unwrap_err();
    assert!(matches!(err, SessionError::Disconnected(_)), "{err}");
    drop(session);

    let calls = fs::read_to_string(&log).unwrap();
    let writes = calls.lines().filter(|line| line.contains("cat >")).count();
    assert_eq!(writes, 1, "{calls}");
    assert!(calls.lines().any(|line| line.contains("-O check")), "{calls}");
}
