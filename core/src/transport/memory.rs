//! In-memory device used by the headless driver and by tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::{DataHandler, DeviceEntry, OpenHandler, RawFile, Subscriptions, Transport};
use crate::error::TransportError;
use crate::path::{file_name, join_path, parent_dir, ROOT};

/// Code executed on the device, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    Code(String),
    Line(String),
}

/// Transport operations, used for call logs and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RunCode,
    RunLine,
    List,
    Read,
    Write,
    SendRaw,
}

#[derive(Debug)]
struct DeviceState {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    executions: Vec<Execution>,
    operations: Vec<Operation>,
    failing: HashSet<Operation>,
    connected: bool,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            dirs: BTreeSet::from([ROOT.to_string()]),
            files: BTreeMap::new(),
            executions: Vec::new(),
            operations: Vec::new(),
            failing: HashSet::new(),
            connected: true,
        }
    }
}

impl DeviceState {
    fn add_dir(&mut self, path: &str) {
        let mut current = normalize(path);
        while current != ROOT {
            let parent = parent_dir(&current);
            self.dirs.insert(current);
            current = parent;
        }
    }

    fn begin(&mut self, op: Operation) -> Result<(), TransportError> {
        self.operations.push(op);
        if !self.connected {
            return Err(TransportError::Disconnected);
        }
        if self.failing.contains(&op) {
            return Err(TransportError::Rejected(format!("{op:?} failed")));
        }
        Ok(())
    }
}

/// Device filesystem and REPL kept in memory.
#[derive(Debug, Default)]
pub struct MemoryDevice {
    state: Mutex<DeviceState>,
    subscriptions: Mutex<Subscriptions>,
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        ROOT.to_string()
    } else {
        trimmed.to_string()
    }
}

impl MemoryDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn subscriptions(&self) -> MutexGuard<'_, Subscriptions> {
        self.subscriptions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Creates `path` and its parents.
    pub fn with_dir(self, path: &str) -> Self {
        self.state().add_dir(path);
        self
    }

    /// Creates a text file, along with its parent directories.
    pub fn with_file(self, path: &str, text: &str) -> Self {
        {
            let mut state = self.state();
            state.add_dir(&parent_dir(path));
            state.files.insert(path.to_string(), text.as_bytes().to_vec());
        }
        self
    }

    pub fn file_text(&self, path: &str) -> Option<String> {
        self.state()
            .files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn file_bytes(&self, path: &str) -> Option<Vec<u8>> {
        self.state().files.get(path).cloned()
    }

    pub fn executions(&self) -> Vec<Execution> {
        self.state().executions.clone()
    }

    /// Every operation attempted so far, failed ones included.
    pub fn operations(&self) -> Vec<Operation> {
        self.state().operations.clone()
    }

    /// Makes every later call of `op` fail until [`recover`](Self::recover).
    pub fn fail(&self, op: Operation) {
        self.state().failing.insert(op);
    }

    pub fn recover(&self, op: Operation) {
        self.state().failing.remove(&op);
    }

    pub fn disconnect(&self) {
        self.state().connected = false;
    }

    /// Marks the session connected and fires the open handler.
    pub fn connect(&self) {
        self.state().connected = true;
        self.subscriptions().emit_open();
    }

    /// Feeds terminal output to the data handler.
    pub fn push_data(&self, data: &str) {
        self.subscriptions().emit_data(data);
    }
}

#[async_trait]
impl Transport for MemoryDevice {
    async fn run_code(&self, code: &str) -> Result<(), TransportError> {
        let mut state = self.state();
        state.begin(Operation::RunCode)?;
        state.executions.push(Execution::Code(code.to_string()));
        Ok(())
    }

    async fn run_line(&self, line: &str) -> Result<(), TransportError> {
        let mut state = self.state();
        state.begin(Operation::RunLine)?;
        state.executions.push(Execution::Line(line.to_string()));
        Ok(())
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<DeviceEntry>, TransportError> {
        let mut state = self.state();
        state.begin(Operation::List)?;
        let dir = normalize(dir);
        if !state.dirs.contains(&dir) {
            return Err(TransportError::NotFound(dir));
        }
        let dirs = state
            .dirs
            .iter()
            .filter(|d| **d != dir && parent_dir(d) == dir)
            .map(|d| DeviceEntry::dir(file_name(d)));
        let files = state
            .files
            .keys()
            .filter(|f| parent_dir(f) == dir)
            .map(|f| DeviceEntry::file(file_name(f)));
        let mut entries: Vec<_> = dirs.chain(files).collect();
        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(entries)
    }

    async fn read_file_as_text(&self, path: &str) -> Result<String, TransportError> {
        let mut state = self.state();
        state.begin(Operation::Read)?;
        let bytes = state
            .files
            .get(path)
            .ok_or_else(|| TransportError::NotFound(path.to_string()))?;
        String::from_utf8(bytes.clone()).map_err(|_| TransportError::InvalidUtf8(path.to_string()))
    }

    async fn write_file_as_text(&self, path: &str, text: &str) -> Result<(), TransportError> {
        let mut state = self.state();
        state.begin(Operation::Write)?;
        let parent = parent_dir(path);
        if !state.dirs.contains(&parent) {
            return Err(TransportError::NotFound(parent));
        }
        state.files.insert(path.to_string(), text.as_bytes().to_vec());
        Ok(())
    }

    async fn send_raw_file(&self, file: &RawFile) -> Result<(), TransportError> {
        let mut state = self.state();
        state.begin(Operation::SendRaw)?;
        let path = join_path(Some(ROOT), Some(&file.name))
            .ok_or_else(|| TransportError::Rejected("empty file name".into()))?;
        state.files.insert(path, file.bytes.clone());
        Ok(())
    }

    fn on_data(&self, handler: DataHandler) {
        self.subscriptions().set_data(handler);
    }

    fn on_open(&self, handler: OpenHandler) {
        self.subscriptions().set_open(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_direct_children_only() {
        let device = MemoryDevice::new()
            .with_file("/user/a.py", "print(1)")
            .with_file("/user/lib/b.py", "")
            .with_file("/boot.py", "");

        let entries = device.list_files("/user").await.unwrap();
        assert_eq!(entries, vec![DeviceEntry::file("a.py"), DeviceEntry::dir("lib")]);

        let root = device.list_files("/").await.unwrap();
        assert_eq!(root, vec![DeviceEntry::file("boot.py"), DeviceEntry::dir("user")]);
    }

    #[tokio::test]
    async fn missing_directory_is_not_found() {
        let device = MemoryDevice::new();
        let err = device.list_files("/nope").await.unwrap_err();
        assert_eq!(err, TransportError::NotFound("/nope".into()));
    }

    #[tokio::test]
    async fn write_requires_existing_parent() {
        let device = MemoryDevice::new().with_dir("/user");
        device.write_file_as_text("/user/a.py", "x = 1").await.unwrap();
        assert_eq!(device.file_text("/user/a.py").as_deref(), Some("x = 1"));

        let err = device.write_file_as_text("/other/a.py", "").await.unwrap_err();
        assert_eq!(err, TransportError::NotFound("/other".into()));
    }

    #[tokio::test]
    async fn injected_failure_is_logged_and_returned() {
        let device = MemoryDevice::new();
        device.fail(Operation::RunCode);
        assert!(matches!(
            device.run_code("print(1)").await,
            Err(TransportError::Rejected(_))
        ));
        assert!(device.executions().is_empty());
        assert_eq!(device.operations(), vec![Operation::RunCode]);

        device.recover(Operation::RunCode);
        device.run_code("print(1)").await.unwrap();
        assert_eq!(device.executions(), vec![Execution::Code("print(1)".into())]);
    }

    #[tokio::test]
    async fn disconnected_device_refuses_everything() {
        let device = MemoryDevice::new();
        device.disconnect();
        assert_eq!(
            device.run_line("import os").await,
            Err(TransportError::Disconnected)
        );
    }
}
