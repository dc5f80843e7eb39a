use chrono::{DateTime, Utc};
use edublocks_core::transport::DataHandler;
use edublocks_core::{
    BlockCompiler, DiagramDocument, Document, DocumentKind, EditorConfig, Transport,
    TransportError,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use super::log_translations::{format_log, LogMessage};
use super::navigation::DirectoryState;
use super::prompt::UserPrompt;
use super::view::ViewMode;
use crate::error::{EditorError, Refusal};
use crate::sync::SyncEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "Info"),
            LogLevel::Warning => write!(f, "Warning"),
            LogLevel::Error => write!(f, "Error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message_key: LogMessage,
    pub args: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(message_key: LogMessage, args: Vec<String>, timestamp: DateTime<Utc>) -> Self {
        let level = message_key.level();
        Self {
            level,
            message_key,
            args,
            timestamp,
        }
    }
}

/// State of the device session as seen by the editor. Becomes `Connected`
/// when the transport reports an opened session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connected,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        ConnectionStatus::Disconnected
    }
}

/// What the page shows right now, for a front end to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub kind: DocumentKind,
    pub document_path: Option<String>,
    pub view_mode: ViewMode,
    pub sync_indicator: bool,
    pub text: Option<String>,
    /// Block XML for the canvas, `None` for scripts.
    pub diagram_source: Option<String>,
    pub cwd: String,
    /// Whether the browser offers a way up from `cwd`.
    pub can_go_up: bool,
    pub terminal_open: bool,
    pub file_browser_open: bool,
    pub connection: ConnectionStatus,
}

/// The editor page: the active document, the visible surface, the file
/// browser and the terminal, wired to one device transport.
pub struct Workspace {
    pub(super) config: EditorConfig,
    pub(super) engine: SyncEngine,
    pub(super) view_mode: ViewMode,
    pub(super) directory: DirectoryState,
    /// terminal panel visible
    pub(super) terminal_open: bool,
    /// file browser modal visible
    pub(super) file_browser_open: bool,
    pub(super) log: Vec<LogEntry>,
    pub(super) status: Arc<watch::Sender<ConnectionStatus>>,
    pub(super) transport: Arc<dyn Transport>,
    pub(super) compiler: Box<dyn BlockCompiler + Send + Sync>,
    pub(super) prompt: Box<dyn UserPrompt>,
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("document", self.engine.document())
            .field("view_mode", &self.view_mode)
            .field("cwd", &self.directory.cwd())
            .field("terminal_open", &self.terminal_open)
            .field("file_browser_open", &self.file_browser_open)
            .field("connection", &self.connection_status())
            .finish_non_exhaustive()
    }
}

impl Workspace {
    pub fn new(
        config: EditorConfig,
        transport: Arc<dyn Transport>,
        compiler: Box<dyn BlockCompiler + Send + Sync>,
        prompt: Box<dyn UserPrompt>,
    ) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::default());
        let status = Arc::new(status);
        let on_open = Arc::clone(&status);
        transport.on_open(Box::new(move || {
            on_open.send_replace(ConnectionStatus::Connected);
        }));

        let home = config.user_dir.clone();
        Self {
            engine: SyncEngine::new(Document::Diagram(DiagramDocument::empty(Some(home.clone())))),
            view_mode: ViewMode::Diagram,
            directory: DirectoryState::new(home),
            terminal_open: false,
            file_browser_open: false,
            log: Vec::new(),
            status,
            transport,
            compiler,
            prompt,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        self.engine.document()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn directory(&self) -> &DirectoryState {
        &self.directory
    }

    pub fn terminal_open(&self) -> bool {
        self.terminal_open
    }

    pub fn close_terminal(&mut self) {
        self.terminal_open = false;
    }

    pub fn file_browser_open(&self) -> bool {
        self.file_browser_open
    }

    /// Path shown in the status bar, `None` for an unsaved document.
    pub fn document_path(&self) -> Option<String> {
        self.engine.document().path()
    }

    /// Whether the text view still mirrors the diagram.
    pub fn sync_indicator(&self) -> bool {
        self.engine.document().is_clean()
    }

    pub fn snapshot(&self) -> Snapshot {
        let doc = self.engine.document();
        Snapshot {
            kind: doc.kind(),
            document_path: doc.path(),
            view_mode: self.view_mode,
            sync_indicator: doc.is_clean(),
            text: doc.text().map(str::to_string),
            diagram_source: doc.diagram_source().map(str::to_string),
            cwd: self.directory.cwd().to_string(),
            can_go_up: !self.directory.is_root(),
            terminal_open: self.terminal_open,
            file_browser_open: self.file_browser_open,
            connection: self.connection_status(),
        }
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Receiver following connection status changes.
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// Routes device output to the terminal.
    pub fn attach_terminal(&self, handler: DataHandler) {
        self.transport.on_data(handler);
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Log entries at `min` or above.
    pub fn log_entries(&self, min: LogLevel) -> impl Iterator<Item = &LogEntry> {
        self.log.iter().filter(move |e| e.level >= min)
    }

    /// Records a notice. Warnings and errors are also reported to the user.
    pub(super) fn notify(&mut self, key: LogMessage, args: Vec<String>) {
        let entry = LogEntry::new(key, args, Utc::now());
        let text = format_log(&entry);
        match entry.level {
            LogLevel::Info => tracing::info!(message_key = ?entry.message_key, "{text}"),
            LogLevel::Warning => tracing::warn!(message_key = ?entry.message_key, "{text}"),
            LogLevel::Error => tracing::error!(message_key = ?entry.message_key, "{text}"),
        }
        if entry.level >= LogLevel::Warning {
            self.prompt.report(&text);
        }
        self.log.push(entry);
    }

    /// Reports `refusal` and turns it into an error for the caller.
    pub(super) fn refuse(&mut self, refusal: Refusal) -> EditorError {
        let (key, args) = LogMessage::for_refusal(&refusal);
        self.notify(key, args);
        refusal.into()
    }

    /// Reports a transport failure under `key`.
    pub(super) fn fail(&mut self, key: LogMessage, err: TransportError) -> EditorError {
        self.notify(key, vec![err.to_string()]);
        err.into()
    }
}
