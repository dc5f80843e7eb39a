//! Contract of the session that talks to the remote device.
//!
//! The editor never owns the connection. It only calls into a [`Transport`]
//! and waits for each call to finish before touching the document again.

mod events;
mod memory;

pub use events::{DataHandler, OpenHandler, Subscriptions};
pub use memory::{Execution, MemoryDevice, Operation};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Entry of a device directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub filename: String,
    pub isdir: bool,
}

impl DeviceEntry {
    pub fn file(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            isdir: false,
        }
    }

    pub fn dir(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            isdir: true,
        }
    }
}

/// Local file picked by the user and pushed to the device as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes inline code on the device.
    async fn run_code(&self, code: &str) -> Result<(), TransportError>;
    /// Executes a single REPL line.
    async fn run_line(&self, line: &str) -> Result<(), TransportError>;
    async fn list_files(&self, dir: &str) -> Result<Vec<DeviceEntry>, TransportError>;
    async fn read_file_as_text(&self, path: &str) -> Result<String, TransportError>;
    async fn write_file_as_text(&self, path: &str, text: &str) -> Result<(), TransportError>;
    async fn send_raw_file(&self, file: &RawFile) -> Result<(), TransportError>;

    /// Registers the terminal output handler, replacing any previous one.
    fn on_data(&self, handler: DataHandler);
    /// Registers the connection-opened handler, replacing any previous one.
    fn on_open(&self, handler: OpenHandler);
}
