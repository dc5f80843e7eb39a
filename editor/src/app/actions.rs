//! User intents that change the document or talk to the device.
//!
//! Each intent either completes a transition or is refused with the document
//! left as it was. Transport calls are awaited before any state is touched,
//! so a failed call never leaves a half-applied change behind.

use edublocks_core::path::{classify, file_name, parent_dir};
use edublocks_core::{Document, RawFile};
use std::sync::Arc;

use super::log_translations::LogMessage;
use super::view::ViewMode;
use super::Workspace;
use crate::error::{Refusal, Result};
use crate::sync::{engine, SyncMessage, SyncOutcome, Transition};

/// What `run` sends to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Dispatch {
    /// Diagrams run their generated text by value.
    Code(String),
    /// Scripts run by reference to the saved file.
    Line(String),
}

impl Workspace {
    pub fn new_document(&mut self) {
        self.engine.reset(Some(self.config.user_dir.clone()));
        self.view_mode = ViewMode::Diagram;
        self.notify(LogMessage::NewDocument, vec![]);
    }

    pub fn rename(&mut self, name: &str) -> Result<()> {
        match self.engine.rename(name) {
            Ok(kind) => {
                self.view_mode = ViewMode::for_kind(kind);
                let renamed = self.engine.document().file_name().unwrap_or(name).to_string();
                self.notify(LogMessage::Renamed, vec![renamed]);
                Ok(())
            }
            Err(refusal) => Err(self.refuse(refusal)),
        }
    }

    /// Applies an edit made on the block canvas. A direct text edit about to
    /// be overwritten is reported before the new text replaces it.
    pub fn edit_from_diagram(&mut self, source: &str, generated: &str) -> Result<SyncOutcome> {
        let transition = engine::edit_from_diagram(self.engine.document(), source, generated)
            .map_err(|refusal| self.refuse(refusal))?;
        if let Transition::Overwrite(_, divergence) = &transition {
            tracing::debug!(discarded = %divergence.discarded, "direct text edit lost");
            self.notify(LogMessage::TextOverwritten, vec![]);
        }
        Ok(self.engine.commit(transition))
    }

    /// Compiles `source` and applies it as a diagram edit.
    pub fn apply_diagram(&mut self, source: &str) -> Result<SyncOutcome> {
        let generated = self.compiler.compile(source);
        self.edit_from_diagram(source, &generated)
    }

    /// Applies an edit made in the text editor.
    pub fn edit_from_text(&mut self, text: &str) -> Result<SyncOutcome> {
        self.engine
            .handle(SyncMessage::TextChanged(text.to_string()))
            .map_err(|refusal| self.refuse(refusal))
    }

    /// Replaces the document with file contents read from `dir_name`.
    pub fn open_document(&mut self, dir_name: &str, file_name: &str, contents: &str) -> Result<()> {
        let dir_name = self.home_for(dir_name);
        match self.engine.open(&dir_name, file_name, contents) {
            Ok(SyncOutcome::Unchanged) => Ok(()),
            Ok(_) => {
                let kind = self.engine.document().kind();
                self.view_mode = ViewMode::for_kind(kind);
                let path = self.engine.document().path().unwrap_or_default();
                self.notify(LogMessage::FileOpened, vec![path]);
                Ok(())
            }
            Err(refusal) => Err(self.refuse(refusal)),
        }
    }

    /// Reads `path` from the device and opens it.
    pub async fn open_path(&mut self, path: &str) -> Result<()> {
        let name = file_name(path).to_string();
        if classify(&name).is_none() {
            return Err(self.refuse(Refusal::UnknownFileType(name)));
        }
        let transport = Arc::clone(&self.transport);
        let contents = transport
            .read_file_as_text(path)
            .await
            .map_err(|err| self.fail(LogMessage::ReadError, err))?;
        self.open_document(&parent_dir(path), &name, &contents)
    }

    /// Directory a file opened from `dir_name` will be saved back to.
    fn home_for(&self, dir_name: &str) -> String {
        let dir = dir_name.trim_end_matches('/');
        if self.config.relocate_samples && dir == self.config.samples_dir.trim_end_matches('/') {
            tracing::debug!(from = dir_name, to = %self.config.user_dir, "relocating sample");
            self.config.user_dir.clone()
        } else {
            dir_name.to_string()
        }
    }

    /// Prompts for a name when the document has none.
    fn ensure_file_name(&mut self) -> Result<()> {
        if self.engine.document().file_name().is_none() {
            let answer = self
                .prompt
                .prompt_filename()
                .filter(|name| !name.trim().is_empty());
            if let Some(name) = answer {
                self.rename(&name)?;
            }
        }
        if self.engine.document().file_name().is_none() {
            return Err(self.refuse(Refusal::MissingFileName));
        }
        Ok(())
    }

    /// Writes the authoritative text to the device. The document itself is
    /// not changed, and in particular stays dirty if it was.
    pub async fn save(&mut self) -> Result<()> {
        self.ensure_file_name()?;
        let doc = self.engine.document();
        let Some(path) = doc.path() else {
            return Err(self.refuse(Refusal::MissingFileName));
        };
        let Some(text) = doc.text().map(str::to_string) else {
            return Err(self.refuse(Refusal::NothingToSave));
        };

        let transport = Arc::clone(&self.transport);
        transport
            .write_file_as_text(&path, &text)
            .await
            .map_err(|err| self.fail(LogMessage::SaveError, err))?;
        self.notify(LogMessage::FileSaved, vec![path]);
        Ok(())
    }

    /// Saves, then executes the document on the device.
    pub async fn run(&mut self) -> Result<()> {
        let runnable = self
            .engine
            .document()
            .text()
            .is_some_and(|text| !text.trim().is_empty());
        if !runnable {
            return Err(self.refuse(Refusal::NothingToRun));
        }
        self.save().await?;

        // Saving may have renamed the document, so look at it again.
        let doc = self.engine.document();
        let path = doc.path().unwrap_or_default();
        let dispatch = match doc {
            Document::Diagram(d) => Dispatch::Code(d.generated_text.clone().unwrap_or_default()),
            Document::Script(_) => Dispatch::Line(self.config.run_instruction(&path)),
        };

        let transport = Arc::clone(&self.transport);
        let sent = match &dispatch {
            Dispatch::Code(code) => transport.run_code(code).await,
            Dispatch::Line(line) => transport.run_line(line).await,
        };
        sent.map_err(|err| self.fail(LogMessage::RunError, err))?;
        self.terminal_open = true;
        self.notify(LogMessage::CodeSent, vec![path]);
        Ok(())
    }

    /// Pushes a local file to the device unchanged.
    pub async fn upload(&mut self, file: RawFile) -> Result<()> {
        let transport = Arc::clone(&self.transport);
        transport
            .send_raw_file(&file)
            .await
            .map_err(|err| self.fail(LogMessage::UploadError, err))?;
        self.notify(LogMessage::Uploaded, vec![file.name]);
        Ok(())
    }
}
