//! Building blocks shared by the editor: paths, documents, the block compiler
//! and the contract of the device transport.

pub mod blocks;
pub mod config;
pub mod document;
pub mod error;
pub mod path;
pub mod transport;

pub use blocks::{BlockCompiler, TableCompiler};
pub use config::EditorConfig;
pub use document::{DiagramDocument, Document, DocumentKind, ScriptDocument};
pub use error::TransportError;
pub use path::{classify, join_path, parent_dir};
pub use transport::{DeviceEntry, MemoryDevice, RawFile, Transport};
