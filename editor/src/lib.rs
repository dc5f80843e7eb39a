//! Editor page of a block-programming environment for MicroPython boards.
//!
//! A [`app::Workspace`] holds the open document and keeps its two views, the
//! block diagram and the generated Python text, consistent while talking to
//! the board through a [`edublocks_core::Transport`].

pub mod app;
pub mod error;
pub mod sync;

pub use app::{Dispatcher, Intent, Reply, UserPrompt, ViewMode, Workspace};
pub use error::{EditorError, Refusal, Result};
