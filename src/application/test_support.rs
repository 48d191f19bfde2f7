//! In-memory remote session for use case tests

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use crate::domain::ports::{
    CommandChannel, CommandOutput, FileChannel, RemoteSession, SessionError,
};
use crate::domain::value_objects::RemotePath;

/// Operation log entry, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Mkdir(String),
    Write(String),
    Remove(String),
    Exec(String),
}

pub struct MockSession {
    pub dirs: RefCell<BTreeSet<String>>,
    pub files: RefCell<BTreeMap<String, Vec<u8>>>,
    pub ops: RefCell<Vec<Op>>,
    /// Paths whose mkdir/write/remove fails with a remote error
    pub failing_paths: RefCell<BTreeSet<String>>,
    /// Canned results keyed by the exact command line sent
    pub responses: RefCell<HashMap<String, Result<CommandOutput, SessionError>>>,
    pub closed: Cell<bool>,
    pub close_calls: Cell<usize>,
}

impl MockSession {
    /// A remote host whose file system contains only `/`
    pub fn new() -> Self {
        let mut dirs = BTreeSet::new();
        dirs.insert("/".to_string());
        Self {
            dirs: RefCell::new(dirs),
            files: RefCell::new(BTreeMap::new()),
            ops: RefCell::new(Vec::new()),
            failing_paths: RefCell::new(BTreeSet::new()),
            responses: RefCell::new(HashMap::new()),
            closed: Cell::new(false),
            close_calls: Cell::new(0),
        }
    }

    pub fn with_dirs(self, dirs: &[&str]) -> Self {
        self.dirs
            .borrow_mut()
            .extend(dirs.iter().map(|d| d.to_string()));
        self
    }

    pub fn fail_on(&self, path: &str) {
        self.failing_paths.borrow_mut().insert(path.to_string());
    }

    pub fn respond(&self, command: &str, result: Result<CommandOutput, SessionError>) {
        self.responses
            .borrow_mut()
            .insert(command.to_string(), result);
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }

    pub fn executed(&self) -> Vec<String> {
        self.ops
            .borrow()
            .iter()
            .filter_map(|op| match op {
                Op::Exec(cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    fn check_open(&self) -> Result<(), SessionError> {
        if self.closed.get() {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }

    fn check_failing(&self, operation: &str, path: &RemotePath) -> Result<(), SessionError> {
        if self.failing_paths.borrow().contains(path.as_str()) {
            return Err(SessionError::Remote {
                operation: operation.to_string(),
                status: Some(1),
                message: format!("{}: Permission denied", path),
            });
        }
        Ok(())
    }

    fn parent_exists(&self, path: &RemotePath) -> bool {
        match path.parent() {
            Some(parent) => self.dirs.borrow().contains(parent.as_str()),
            None => true,
        }
    }
}

impl FileChannel for MockSession {
    fn create_dir(&self, path: &RemotePath) -> Result<(), SessionError> {
        self.check_open()?;
        self.ops.borrow_mut().push(Op::Mkdir(path.to_string()));
        self.check_failing("mkdir", path)?;
        if self.dirs.borrow().contains(path.as_str()) {
            return Err(SessionError::DirectoryExists(path.clone()));
        }
        if !self.parent_exists(path) {
            return Err(SessionError::Remote {
                operation: "mkdir".to_string(),
                status: Some(1),
                message: format!("{}: No such file or directory", path),
            });
        }
        self.dirs.borrow_mut().insert(path.to_string());
        Ok(())
    }

    fn write_file(&self, path: &RemotePath, contents: &[u8]) -> Result<(), SessionError> {
        self.check_open()?;
        self.ops.borrow_mut().push(Op::Write(path.to_string()));
        self.check_failing("write", path)?;
        if !self.parent_exists(path) {
            return Err(SessionError::Remote {
                operation: "write".to_string(),
                status: Some(1),
                message: format!("{}: No such file or directory", path),
            });
        }
        self.files
            .borrow_mut()
            .insert(path.to_string(), contents.to_vec());
        Ok(())
    }

    fn remove_file(&self, path: &RemotePath) -> Result<(), SessionError> {
        self.check_open()?;
        self.ops.borrow_mut().push(Op::Remove(path.to_string()));
        self.check_failing("remove", path)?;
        self.files.borrow_mut().remove(path.as_str());
        Ok(())
    }
}

impl CommandChannel for MockSession {
    fn execute(&self, command: &str, _timeout: Duration) -> Result<CommandOutput, SessionError> {
        self.check_open()?;
        self.ops.borrow_mut().push(Op::Exec(command.to_string()));
        match self.responses.borrow().get(command) {
            Some(result) => result.clone(),
            None => Ok(CommandOutput {
                status: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            }),
        }
    }
}

impl RemoteSession for MockSession {
    fn target(&self) -> String {
        "mock@remote:22".to_string()
    }

    fn is_open(&self) -> bool {
        !self.closed.get()
    }

    fn close(&mut self) {
        self.close_calls.set(self.close_calls.get() + 1);
        self.closed.set(true);
    }
}

pub fn remote(path: &str) -> RemotePath {
    RemotePath::new(path).unwrap()
}
