//! Browsing the device filesystem from the file browser.

use edublocks_core::path::{classify, join_path, parent_dir, ROOT, SEPARATOR};
use edublocks_core::{DeviceEntry, Transport, TransportError};
use std::sync::Arc;

use super::log_translations::LogMessage;
use super::Workspace;
use crate::error::{Refusal, Result};

/// Current directory of the file browser and its last listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryState {
    cwd: String,
    listing: Vec<DeviceEntry>,
}

impl DirectoryState {
    pub fn new(cwd: impl Into<String>) -> Self {
        Self {
            cwd: cwd.into(),
            listing: Vec::new(),
        }
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn listing(&self) -> &[DeviceEntry] {
        &self.listing
    }

    pub fn is_root(&self) -> bool {
        self.cwd == ROOT
    }

    /// Directory reached from the current one through `segment`.
    ///
    /// `..` goes up one level and stops at the root, `.` stays put.
    pub fn resolve(&self, segment: &str) -> std::result::Result<String, Refusal> {
        match segment {
            "." => Ok(self.cwd.clone()),
            ".." => Ok(parent_dir(&self.cwd)),
            s if s.trim().is_empty() => Err(Refusal::InvalidPath(s.to_string())),
            s => {
                let joined = join_path(Some(&self.cwd), Some(s))
                    .ok_or_else(|| Refusal::InvalidPath(s.to_string()))?;
                let trimmed = joined.trim_end_matches(SEPARATOR);
                Ok(if trimmed.is_empty() {
                    ROOT.to_string()
                } else {
                    trimmed.to_string()
                })
            }
        }
    }

    /// Lists `dir` and makes it current. On failure nothing changes.
    pub async fn load(
        &mut self,
        transport: &dyn Transport,
        dir: String,
    ) -> std::result::Result<(), TransportError> {
        let listing = transport.list_files(&dir).await?;
        tracing::debug!(dir = %dir, entries = listing.len(), "directory listed");
        self.cwd = dir;
        self.listing = listing;
        Ok(())
    }
}

/// Entries worth showing: directories and files the editor can open, minus
/// the boot file.
pub fn visible_entries<'a>(listing: &'a [DeviceEntry], boot_file: &str) -> Vec<&'a DeviceEntry> {
    listing
        .iter()
        .filter(|e| e.filename != boot_file)
        .filter(|e| e.isdir || classify(&e.filename).is_some())
        .collect()
}

impl Workspace {
    /// Shows the file browser at the user directory.
    pub async fn open_file_browser(&mut self) -> Result<()> {
        self.file_browser_open = true;
        let home = self.config.user_dir.clone();
        self.list_directory(home).await
    }

    pub fn close_file_browser(&mut self) {
        self.file_browser_open = false;
    }

    /// Moves the file browser through `segment` and lists the new directory.
    pub async fn change_directory(&mut self, segment: &str) -> Result<()> {
        let target = self
            .directory
            .resolve(segment)
            .map_err(|refusal| self.refuse(refusal))?;
        self.list_directory(target).await
    }

    async fn list_directory(&mut self, dir: String) -> Result<()> {
        let transport = Arc::clone(&self.transport);
        let listed = self.directory.load(transport.as_ref(), dir).await;
        listed.map_err(|err| self.fail(LogMessage::ListError, err))
    }

    /// Entries of the current directory the browser should show.
    pub fn visible_entries(&self) -> Vec<&DeviceEntry> {
        visible_entries(self.directory.listing(), &self.config.boot_file)
    }

    /// Handles a click in the file browser: directories are entered, files are
    /// read and opened, closing the browser.
    pub async fn select_entry(&mut self, entry: &DeviceEntry) -> Result<()> {
        if entry.isdir {
            return self.change_directory(&entry.filename).await;
        }
        let dir = self.directory.cwd().to_string();
        let Some(path) = join_path(Some(&dir), Some(&entry.filename)) else {
            return Err(self.refuse(Refusal::InvalidPath(entry.filename.clone())));
        };
        if classify(&entry.filename).is_none() {
            return Err(self.refuse(Refusal::UnknownFileType(entry.filename.clone())));
        }
        let transport = Arc::clone(&self.transport);
        let contents = transport
            .read_file_as_text(&path)
            .await
            .map_err(|err| self.fail(LogMessage::ReadError, err))?;
        self.file_browser_open = false;
        self.open_document(&dir, &entry.filename, &contents)
    }
}
