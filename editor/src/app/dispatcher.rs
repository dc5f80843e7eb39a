//! Serialized access to a [`Workspace`].
//!
//! The page must never run two intents at once: a save that is waiting on the
//! device has to finish before the next edit looks at the document. The
//! [`Dispatcher`] moves the workspace onto its own task and hands it one
//! [`Intent`] at a time, answering each sender through a `oneshot` channel.
//! Refusals and device errors travel back to the sender unchanged; the worker
//! keeps running after them.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use edublocks::app::{Dispatcher, Intent, Reply, ScriptedPrompt, Workspace};
//! use edublocks_core::{EditorConfig, MemoryDevice, TableCompiler};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let device = Arc::new(MemoryDevice::new().with_dir("/user"));
//! let workspace = Workspace::new(
//!     EditorConfig::default(),
//!     device.clone(),
//!     Box::new(TableCompiler::default()),
//!     Box::new(ScriptedPrompt::new()),
//! );
//! let dispatcher = Dispatcher::spawn(workspace, 8);
//!
//! dispatcher.send(Intent::TextChanged("print(1)\n".into())).await.unwrap();
//! dispatcher.send(Intent::Rename("hello.py".into())).await.unwrap();
//! assert_eq!(dispatcher.send(Intent::Save).await.unwrap(), Reply::Done);
//!
//! let workspace = dispatcher.shutdown().await.unwrap();
//! assert_eq!(workspace.document_path().as_deref(), Some("/user/hello.py"));
//! assert_eq!(device.file_text("/user/hello.py").as_deref(), Some("print(1)\n"));
//! # }
//! ```

use edublocks_core::{DeviceEntry, RawFile};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::state::Snapshot;
use super::view::ViewMode;
use super::Workspace;
use crate::error::EditorError;
use crate::sync::SyncOutcome;

/// Everything the user can ask the editor page to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    New,
    Rename(String),
    /// Open file contents already fetched by the caller.
    Open {
        dir_name: String,
        file_name: String,
        contents: String,
    },
    OpenPath(String),
    Save,
    Run,
    /// Canvas changed; the text is produced by the block compiler.
    DiagramEdited(String),
    /// Canvas changed together with its generated text.
    DiagramChanged {
        source: String,
        generated: String,
    },
    TextChanged(String),
    SetView(ViewMode),
    ToggleView,
    OpenFileBrowser,
    CloseFileBrowser,
    ChangeDirectory(String),
    SelectEntry(DeviceEntry),
    Upload(RawFile),
    CloseTerminal,
    /// Asks for the current state without changing it.
    Inspect,
}

/// Result of an intent that completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Done,
    Edited(SyncOutcome),
    /// Visible entries of the directory the browser now shows.
    Listing(Vec<DeviceEntry>),
    State(Box<Snapshot>),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("editor worker has stopped")]
    Closed,
    #[error(transparent)]
    Editor(#[from] EditorError),
}

type Job = (Intent, oneshot::Sender<Result<Reply, EditorError>>);

impl Workspace {
    /// Carries out one intent.
    pub async fn apply(&mut self, intent: Intent) -> Result<Reply, EditorError> {
        tracing::trace!(?intent, "applying intent");
        match intent {
            Intent::New => self.new_document(),
            Intent::Rename(name) => self.rename(&name)?,
            Intent::Open {
                dir_name,
                file_name,
                contents,
            } => self.open_document(&dir_name, &file_name, &contents)?,
            Intent::OpenPath(path) => self.open_path(&path).await?,
            Intent::Save => self.save().await?,
            Intent::Run => self.run().await?,
            Intent::DiagramEdited(source) => return self.apply_diagram(&source).map(Reply::Edited),
            Intent::DiagramChanged { source, generated } => {
                return self.edit_from_diagram(&source, &generated).map(Reply::Edited)
            }
            Intent::TextChanged(text) => return self.edit_from_text(&text).map(Reply::Edited),
            Intent::SetView(mode) => self.set_view(mode)?,
            Intent::ToggleView => self.toggle_view()?,
            Intent::OpenFileBrowser => {
                self.open_file_browser().await?;
                return Ok(self.listing());
            }
            Intent::CloseFileBrowser => self.close_file_browser(),
            Intent::ChangeDirectory(segment) => {
                self.change_directory(&segment).await?;
                return Ok(self.listing());
            }
            Intent::SelectEntry(entry) => {
                self.select_entry(&entry).await?;
                if entry.isdir {
                    return Ok(self.listing());
                }
            }
            Intent::Upload(file) => self.upload(file).await?,
            Intent::CloseTerminal => self.close_terminal(),
            Intent::Inspect => return Ok(Reply::State(Box::new(self.snapshot()))),
        }
        Ok(Reply::Done)
    }

    fn listing(&self) -> Reply {
        Reply::Listing(self.visible_entries().into_iter().cloned().collect())
    }
}

/// Runs a [`Workspace`] on a background task and feeds it intents one at a
/// time, in the order they were sent.
pub struct Dispatcher {
    tx: Option<mpsc::Sender<Job>>,
    handle: Option<JoinHandle<Workspace>>,
}

impl Dispatcher {
    /// Moves `workspace` onto a new task. `capacity` bounds the queue of
    /// pending intents.
    pub fn spawn(workspace: Workspace, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run_worker(workspace, rx));
        Self {
            tx: Some(tx),
            handle: Some(handle),
        }
    }

    /// Queues `intent` and waits for it to be applied.
    pub async fn send(&self, intent: Intent) -> Result<Reply, DispatchError> {
        let tx = self.tx.as_ref().ok_or(DispatchError::Closed)?;
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send((intent, reply_tx))
            .await
            .map_err(|_| DispatchError::Closed)?;
        let reply = reply_rx.await.map_err(|_| DispatchError::Closed)?;
        Ok(reply?)
    }

    /// Stops accepting intents, lets queued ones finish and hands the
    /// workspace back.
    pub async fn shutdown(mut self) -> Result<Workspace, DispatchError> {
        self.tx.take();
        let handle = self.handle.take().ok_or(DispatchError::Closed)?;
        handle.await.map_err(|err| {
            tracing::error!(error = %err, "editor worker failed");
            DispatchError::Closed
        })
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        // Without a sender the worker drains its queue and exits.
        self.tx.take();
    }
}

async fn run_worker(mut workspace: Workspace, mut rx: mpsc::Receiver<Job>) -> Workspace {
    while let Some((intent, reply)) = rx.recv().await {
        let result = workspace.apply(intent).await;
        if reply.send(result).is_err() {
            tracing::debug!("intent sender went away before the reply");
        }
    }
    tracing::debug!("editor worker stopped");
    workspace
}
