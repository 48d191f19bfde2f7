//! Property tests for the tree mirror against an in-memory remote.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use proptest::prelude::*;
use rdeploy::domain::ports::{FileChannel, SessionError};
use rdeploy::domain::value_objects::DEFAULT_EXCLUSIONS;
use rdeploy::{PathSynchronizer, RemotePath, StepKind, SyncSpec};
use tempfile::tempdir;

/// A remote file system that only knows directories and file bytes
struct MemoryRemote {
    dirs: RefCell<BTreeSet<String>>,
    files: RefCell<BTreeMap<String, Vec<u8>>>,
}

impl MemoryRemote {
    fn new() -> Self {
        let dirs = ["/", "/srv"].iter().map(|d| d.to_string()).collect();
        Self {
            dirs: RefCell::new(dirs),
            files: RefCell::new(BTreeMap::new()),
        }
    }

    fn parent_exists(&self, path: &RemotePath) -> bool {
        path.parent()
            .map(|p| self.dirs.borrow().contains(p.as_str()))
            .unwrap_or(false)
    }

    fn missing_parent(operation: &str) -> SessionError {
        SessionError::Remote {
            operation: operation.to_string(),
            status: Some(1),
            message: "No such file or directory".to_string(),
        }
    }
}

impl FileChannel for MemoryRemote {
    fn create_dir(&self, path: &RemotePath) -> Result<(), SessionError> {
        if self.dirs.borrow().contains(path.as_str()) {
            return Err(SessionError::DirectoryExists(path.clone()));
        }
        if !self.parent_exists(path) {
            return Err(Self::missing_parent("mkdir"));
        }
        self.dirs.borrow_mut().insert(path.to_string());
        Ok(())
    }

    fn write_file(&self, path: &RemotePath, contents: &[u8]) -> Result<(), SessionError> {
        if !self.parent_exists(path) {
            return Err(Self::missing_parent("write"));
        }
        self.files
            .borrow_mut()
            .insert(path.to_string(), contents.to_vec());
        Ok(())
    }

    fn remove_file(&self, path: &RemotePath) -> Result<(), SessionError> {
        self.files.borrow_mut().remove(path.as_str());
        Ok(())
    }
}

/// Directory names never collide with file names (`f0.txt` ...)
fn dir_segment() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-c]".prop_map(String::from),
        1 => Just("node_modules".to_string()),
        1 => Just(".git".to_string()),
    ]
}

fn file_entry() -> impl Strategy<Value = (Vec<String>, String, Vec<u8>)> {
    (
        proptest::collection::vec(dir_segment(), 0..=3),
        "f[0-9]\\.txt",
        proptest::collection::vec(any::<u8>(), 0..64),
    )
}

fn relative(dirs: &[String], name: &str) -> String {
    let mut parts: Vec<&str> = dirs.iter().map(String::as_str).collect();
    parts.push(name);
    parts.join("/")
}

fn is_excluded(rel: &str) -> bool {
    rel.split('/').any(|seg| DEFAULT_EXCLUSIONS.contains(&seg))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every non-excluded file exists remotely with identical bytes,
    /// nothing excluded appears, and a second run changes nothing.
    #[test]
    fn property_sync_mirrors_tree_and_is_idempotent(
        entries in proptest::collection::vec(file_entry(), 0..12)
    ) {
        let dir = tempdir().unwrap();
        let mut expected = BTreeMap::new();
        for (dirs, name, bytes) in &entries {
            let rel = relative(dirs, name);
            let path = dir.path().join(&rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, bytes).unwrap();
            if !is_excluded(&rel) {
                expected.insert(format!("/srv/app/{}", rel), bytes.clone());
            }
        }

        let remote = MemoryRemote::new();
        let spec = SyncSpec::new(dir.path(), RemotePath::new("/srv/app").unwrap());
        let synchronizer = PathSynchronizer::new();

        let first = synchronizer.sync(&remote, &spec);
        prop_assert!(first.iter().all(|s| !s.is_failure()), "{:?}", first);
        prop_assert_eq!(&*remote.files.borrow(), &expected);
        for path in remote.dirs.borrow().iter() {
            prop_assert!(!is_excluded(path.trim_start_matches('/')), "{}", path);
        }

        let dirs_after_first = remote.dirs.borrow().clone();
        let second = synchronizer.sync(&remote, &spec);
        prop_assert_eq!(
            second.iter().filter(|s| s.kind == StepKind::DirCreated).count(),
            0
        );
        prop_assert_eq!(
            second.iter().filter(|s| s.kind == StepKind::DirSkippedExists).count(),
            first.iter().filter(|s| s.kind == StepKind::DirCreated).count()
        );
        prop_assert_eq!(&*remote.dirs.borrow(), &dirs_after_first);
        prop_assert_eq!(&*remote.files.borrow(), &expected);
    }

    /// PROPERTY: a directory's step always precedes the steps of its entries.
    #[test]
    fn property_parent_steps_come_first(
        entries in proptest::collection::vec(file_entry(), 1..12)
    ) {
        let dir = tempdir().unwrap();
        for (dirs, name, bytes) in &entries {
            let path = dir.path().join(relative(dirs, name));
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, bytes).unwrap();
        }

        let remote = MemoryRemote::new();
        let spec = SyncSpec::new(dir.path(), RemotePath::new("/srv/app").unwrap());
        let steps = PathSynchronizer::new().sync(&remote, &spec);

        let position: BTreeMap<&str, usize> = steps
            .iter()
            .enumerate()
            .map(|(i, s)| (s.target.as_str(), i))
            .collect();
        for (index, step) in steps.iter().enumerate() {
            let parent = RemotePath::new(&step.target).unwrap().parent().unwrap();
            if let Some(parent_index) = position.get(parent.as_str()) {
                prop_assert!(*parent_index < index, "{} before its parent", step.target);
            } else {
                prop_assert_eq!(&step.target, "/srv/app");
            }
        }
    }
}
