//! Scenario: mirror a local tree and write artifacts through the transport

use std::fs;
use std::path::{Path, PathBuf};

use rdeploy::domain::value_objects::ExclusionSet;
use rdeploy::{
    ArtifactSpec, ConnectionConfig, Credential, DeployOptions, DeploymentOrchestrator,
    OpenSshConnector, RemotePath, StepKind, SyncSpec,
};
use tempfile::tempdir;

use crate::common::{install_fake_ssh, install_script, write_tree};

fn config() -> ConnectionConfig {
    ConnectionConfig::new(
        "deploy.example.test",
        22,
        "deploy",
        Credential::IdentityFile("id_test".into()),
    )
    .unwrap()
}

fn orchestrator(work: &Path) -> DeploymentOrchestrator<OpenSshConnector> {
    orchestrator_with(install_fake_ssh(work))
}

fn orchestrator_with(ssh: PathBuf) -> DeploymentOrchestrator<OpenSshConnector> {
    let connector = OpenSshConnector::new().with_program(ssh);
    DeploymentOrchestrator::new(connector, DeployOptions::new())
}

/// Master and control commands succeed; every operation loses the connection
const DROPPING_SSH: &str = r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    -M|-O) exit 0 ;;
  esac
done
echo "Connection to deploy.example.test closed by remote host." >&2
exit 255
"#;

fn remote(path: &Path) -> RemotePath {
    RemotePath::new(path.to_str().unwrap()).unwrap()
}

#[test]
fn excluded_names_never_reach_the_remote() {
    let work = tempdir().unwrap();
    let local = work.path().join("backend");
    write_tree(
        &local,
        &[
            ("app/Models/Foo.php", "<?php class Foo {}"),
            ("node_modules/x.js", "module.exports = 1;"),
        ],
    );
    let server = work.path().join("srv");
    fs::create_dir_all(&server).unwrap();
    let root = server.join("backend");

    let spec = SyncSpec::new(&local, remote(&root))
        .with_exclusions(ExclusionSet::from_names(["node_modules"]));
    let report = orchestrator(work.path()).deploy(&config(), vec![spec], vec![], vec![]);

    assert!(report.success(), "{:?}", report.failed_steps().collect::<Vec<_>>());
    assert_eq!(
        fs::read_to_string(root.join("app/Models/Foo.php")).unwrap(),
        "<?php class Foo {}"
    );
    assert!(!root.join("node_modules").exists());
    assert_eq!(report.count(StepKind::FileWritten), 1);
}

#[test]
fn second_sync_reports_existing_directories() {
    let work = tempdir().unwrap();
    let local = work.path().join("site");
    write_tree(&local, &[("index.html", "<h1>hi</h1>"), ("css/site.css", "body{}")]);
    let root = work.path().join("www");
    let deploy = || {
        orchestrator(work.path()).deploy(
            &config(),
            vec![SyncSpec::new(&local, remote(&root))],
            vec![],
            vec![],
        )
    };

    let first = deploy();
    assert_eq!(first.count(StepKind::DirCreated), 2);

    let second = deploy();
    assert!(second.success());
    assert_eq!(second.count(StepKind::DirCreated), 0);
    assert_eq!(second.count(StepKind::DirSkippedExists), 2);
    assert_eq!(second.count(StepKind::FileWritten), 2);
    assert_eq!(fs::read_to_string(root.join("css/site.css")).unwrap(), "body{}");
}

#[test]
fn binary_content_survives_transfer() {
    let work = tempdir().unwrap();
    let local = work.path().join("assets");
    fs::create_dir_all(&local).unwrap();
    let bytes: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();
    fs::write(local.join("icon.bin"), &bytes).unwrap();
    let root = work.path().join("out");

    let report = orchestrator(work.path()).deploy(
        &config(),
        vec![SyncSpec::new(&local, remote(&root))],
        vec![],
        vec![],
    );

    assert!(report.success());
    assert_eq!(fs::read(root.join("icon.bin")).unwrap(), bytes);
}

#[test]
fn artifact_into_missing_directory_is_a_transfer_failure() {
    let work = tempdir().unwrap();
    let present = work.path().join("present");
    fs::create_dir_all(&present).unwrap();

    let report = orchestrator(work.path()).deploy(
        &config(),
        vec![],
        vec![
            ArtifactSpec::new(remote(&work.path().join("missing/X.php")), "<?php"),
            ArtifactSpec::new(remote(&present.join("Y.php")), "<?php // y"),
        ],
        vec![],
    );

    let kinds: Vec<StepKind> = report.steps().iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![StepKind::TransferFailed, StepKind::FileWritten]);
    assert!(report.success());
    assert!(report.has_failures());
    assert_eq!(fs::read_to_string(present.join("Y.php")).unwrap(), "<?php // y");
}

#[test]
fn mkdir_under_a_regular_file_is_a_directory_failure() {
    let work = tempdir().unwrap();
    let local = work.path().join("site");
    write_tree(&local, &[("index.html", "<h1>hi</h1>")]);
    let blocker = work.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let report = orchestrator(work.path()).deploy(
        &config(),
        vec![SyncSpec::new(&local, remote(&blocker.join("www")))],
        vec![],
        vec![],
    );

    let kinds: Vec<StepKind> = report.steps().iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![StepKind::DirFailed]);
    let error = report.steps()[0].error.as_ref().unwrap().to_string();
    assert!(error.contains("mkdir failed"), "{error}");
    assert!(report.success());
    assert!(report.has_failures());
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
}

#[test]
fn dropped_connection_fails_each_operation_as_disconnected() {
    let work = tempdir().unwrap();
    let ssh = install_script(work.path(), "dropping-ssh", DROPPING_SSH);
    let target = work.path().join("X.php");

    let report = orchestrator_with(ssh).deploy(
        &config(),
        vec![],
        vec![ArtifactSpec::new(remote(&target), "<?php")],
        vec![],
    );

    assert_eq!(report.steps().len(), 1);
    let step = &report.steps()[0];
    assert_eq!(step.kind, StepKind::TransferFailed);
    let error = step.error.as_ref().unwrap().to_string();
    assert!(error.contains("session disconnected"), "{error}");
    assert!(error.contains("closed by remote host"), "{error}");
    assert!(!target.exists());
}
