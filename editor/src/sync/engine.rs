//! Document state machine.
//!
//! Every user intent is a transition from the current [`Document`] to the next
//! one. Transitions are pure functions over document values; [`SyncEngine`]
//! owns the single active document and applies them. A refused transition
//! leaves the document exactly as it was.
//!
//! ```rust
//! use edublocks::sync::{SyncEngine, SyncMessage, SyncOutcome};
//!
//! let mut engine = SyncEngine::default();
//! let outcome = engine
//!     .handle(SyncMessage::DiagramChanged {
//!         source: "<xml/>".into(),
//!         generated: String::new(),
//!     })
//!     .unwrap();
//! assert_eq!(outcome, SyncOutcome::Updated);
//! assert!(engine.document().is_clean());
//! ```

use edublocks_core::path::{classify, SEPARATOR};
use edublocks_core::{DiagramDocument, Document, DocumentKind, ScriptDocument};

use super::divergence::Divergence;
use crate::error::Refusal;

/// Edits coming from the two editing surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncMessage {
    /// The block canvas changed. Carries the diagram and its compiled text.
    DiagramChanged { source: String, generated: String },
    /// The text editor changed.
    TextChanged(String),
}

/// Result of an accepted edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Unchanged,
    Updated,
    /// Updated, but a direct text edit was overwritten by the diagram.
    Overwritten(Divergence),
}

/// Next document computed by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Next(Document),
    Overwrite(Document, Divergence),
}

/// Empty, unnamed diagram.
pub fn new_document(dir_name: Option<String>) -> Document {
    Document::Diagram(DiagramDocument::empty(dir_name))
}

/// Renames the document, converting a diagram into a script when the new name
/// asks for it. Names without a known extension become diagram names.
pub fn rename(doc: &Document, name: &str) -> Result<Document, Refusal> {
    if name.trim().is_empty() {
        return Err(Refusal::EmptyFileName);
    }
    if name.contains(SEPARATOR) {
        return Err(Refusal::InvalidPath(name.to_string()));
    }
    let (kind, file_name) = match classify(name) {
        Some(kind) => (kind, name.to_string()),
        None => (
            DocumentKind::Diagram,
            format!("{name}{}", DocumentKind::Diagram.suffix()),
        ),
    };

    match (doc, kind) {
        (Document::Diagram(d), DocumentKind::Diagram) => Ok(Document::Diagram(DiagramDocument {
            file_name: Some(file_name),
            ..d.clone()
        })),
        (Document::Script(s), DocumentKind::Script) => Ok(Document::Script(ScriptDocument {
            file_name: Some(file_name),
            ..s.clone()
        })),
        // Lossy: the diagram source is dropped, the text carries over as-is.
        (Document::Diagram(d), DocumentKind::Script) => Ok(Document::Script(ScriptDocument {
            dir_name: d.dir_name.clone(),
            file_name: Some(file_name),
            script_text: d.generated_text.clone().unwrap_or_default(),
        })),
        (Document::Script(_), DocumentKind::Diagram) => Err(Refusal::ScriptToDiagram),
    }
}

/// Applies a diagram edit. The compiled text always replaces the current text.
pub fn edit_from_diagram(
    doc: &Document,
    source: &str,
    generated: &str,
) -> Result<Transition, Refusal> {
    // Scripts have no canvas to edit.
    let Document::Diagram(current) = doc else {
        return Err(Refusal::DiagramViewUnavailable);
    };
    if current.diagram_source.as_deref() == Some(source)
        && current.generated_text.as_deref() == Some(generated)
    {
        return Ok(Transition::Unchanged);
    }

    let next = Document::Diagram(DiagramDocument {
        dir_name: current.dir_name.clone(),
        file_name: current.file_name.clone(),
        diagram_source: Some(source.to_string()),
        generated_text: Some(generated.to_string()),
        text_is_clean: true,
    });
    Ok(match Divergence::detect(current, generated) {
        Some(divergence) => Transition::Overwrite(next, divergence),
        None => Transition::Next(next),
    })
}

/// Applies a text edit. On a diagram this marks the text as diverged.
pub fn edit_from_text(doc: &Document, text: &str) -> Transition {
    if doc.text() == Some(text) {
        return Transition::Unchanged;
    }
    Transition::Next(match doc {
        Document::Diagram(d) => Document::Diagram(DiagramDocument {
            generated_text: Some(text.to_string()),
            text_is_clean: false,
            ..d.clone()
        }),
        Document::Script(s) => Document::Script(ScriptDocument {
            script_text: text.to_string(),
            ..s.clone()
        }),
    })
}

/// Builds the document for a file read from the device. Never merges with
/// `current`; the only exception is re-opening the very same script, which
/// keeps the current value.
pub fn open_document(
    current: &Document,
    dir_name: &str,
    file_name: &str,
    contents: &str,
) -> Result<Transition, Refusal> {
    let kind = classify(file_name).ok_or_else(|| Refusal::UnknownFileType(file_name.to_string()))?;
    let next = Document::from_contents(kind, dir_name, file_name, contents);
    if kind == DocumentKind::Script && &next == current {
        return Ok(Transition::Unchanged);
    }
    Ok(Transition::Next(next))
}

/// Owner of the active document.
#[derive(Debug, Clone, Default)]
pub struct SyncEngine {
    doc: Document,
}

impl SyncEngine {
    pub fn new(doc: Document) -> Self {
        Self { doc }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Makes the document computed by `transition` current.
    pub fn commit(&mut self, transition: Transition) -> SyncOutcome {
        let outcome = self.apply(transition);
        tracing::debug!(?outcome, clean = self.doc.is_clean(), "edit applied");
        outcome
    }

    fn apply(&mut self, transition: Transition) -> SyncOutcome {
        match transition {
            Transition::Unchanged => SyncOutcome::Unchanged,
            Transition::Next(doc) => {
                self.doc = doc;
                SyncOutcome::Updated
            }
            Transition::Overwrite(doc, divergence) => {
                self.doc = doc;
                SyncOutcome::Overwritten(divergence)
            }
        }
    }

    /// Processes an edit from one of the editing surfaces.
    pub fn handle(&mut self, msg: SyncMessage) -> Result<SyncOutcome, Refusal> {
        let transition = match &msg {
            SyncMessage::DiagramChanged { source, generated } => {
                edit_from_diagram(&self.doc, source, generated)?
            }
            SyncMessage::TextChanged(text) => edit_from_text(&self.doc, text),
        };
        Ok(self.commit(transition))
    }

    /// Renames the document and returns its resulting kind.
    pub fn rename(&mut self, name: &str) -> Result<DocumentKind, Refusal> {
        let next = rename(&self.doc, name)?;
        tracing::debug!(from = %self.doc.kind(), to = %next.kind(), name, "document renamed");
        self.doc = next;
        Ok(self.doc.kind())
    }

    /// Replaces the document with an empty diagram.
    pub fn reset(&mut self, dir_name: Option<String>) {
        self.doc = new_document(dir_name);
    }

    pub fn open(
        &mut self,
        dir_name: &str,
        file_name: &str,
        contents: &str,
    ) -> Result<SyncOutcome, Refusal> {
        let transition = open_document(&self.doc, dir_name, file_name, contents)?;
        Ok(self.apply(transition))
    }
}
