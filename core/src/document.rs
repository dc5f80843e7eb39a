//! Document model: the single value describing what is currently open.
//!
//! A document is either a block diagram (with text generated from it) or a
//! plain script. The two variants never share state; moving between them
//! always builds a fresh value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::path::join_path;

/// Kind of document, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Diagram,
    Script,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Diagram, DocumentKind::Script];

    /// Suffix matched against file names, including the dot.
    pub fn suffix(self) -> &'static str {
        match self {
            DocumentKind::Diagram => ".xml",
            DocumentKind::Script => ".py",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Diagram => write!(f, "diagram"),
            DocumentKind::Script => write!(f, "script"),
        }
    }
}

/// Block diagram together with the text compiled from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDocument {
    pub dir_name: Option<String>,
    pub file_name: Option<String>,
    pub diagram_source: Option<String>,
    /// Compiler output for `diagram_source`, or a direct edit of it.
    pub generated_text: Option<String>,
    /// `false` once `generated_text` was edited independently of the diagram.
    pub text_is_clean: bool,
}

impl DiagramDocument {
    /// Empty, unnamed diagram living in `dir_name`.
    pub fn empty(dir_name: Option<String>) -> Self {
        Self {
            dir_name,
            file_name: None,
            diagram_source: None,
            generated_text: None,
            text_is_clean: true,
        }
    }
}

/// Directly authored script text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptDocument {
    pub dir_name: Option<String>,
    pub file_name: Option<String>,
    pub script_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Document {
    Diagram(DiagramDocument),
    Script(ScriptDocument),
}

impl Default for Document {
    fn default() -> Self {
        Document::Diagram(DiagramDocument::empty(None))
    }
}

impl Document {
    /// Builds a document of `kind` from file contents read from the device.
    pub fn from_contents(
        kind: DocumentKind,
        dir_name: impl Into<String>,
        file_name: impl Into<String>,
        contents: impl Into<String>,
    ) -> Self {
        match kind {
            DocumentKind::Diagram => Document::Diagram(DiagramDocument {
                dir_name: Some(dir_name.into()),
                file_name: Some(file_name.into()),
                diagram_source: Some(contents.into()),
                generated_text: None,
                text_is_clean: true,
            }),
            DocumentKind::Script => Document::Script(ScriptDocument {
                dir_name: Some(dir_name.into()),
                file_name: Some(file_name.into()),
                script_text: contents.into(),
            }),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Diagram(_) => DocumentKind::Diagram,
            Document::Script(_) => DocumentKind::Script,
        }
    }

    pub fn dir_name(&self) -> Option<&str> {
        match self {
            Document::Diagram(d) => d.dir_name.as_deref(),
            Document::Script(s) => s.dir_name.as_deref(),
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match self {
            Document::Diagram(d) => d.file_name.as_deref(),
            Document::Script(s) => s.file_name.as_deref(),
        }
    }

    /// The authoritative text: generated text for diagrams, script text otherwise.
    pub fn text(&self) -> Option<&str> {
        match self {
            Document::Diagram(d) => d.generated_text.as_deref(),
            Document::Script(s) => Some(s.script_text.as_str()),
        }
    }

    /// Diagram source, empty for scripts.
    pub fn diagram_source(&self) -> Option<&str> {
        match self {
            Document::Diagram(d) => d.diagram_source.as_deref(),
            Document::Script(_) => None,
        }
    }

    /// Whether the text still matches the diagram. Scripts are always clean.
    pub fn is_clean(&self) -> bool {
        match self {
            Document::Diagram(d) => d.text_is_clean,
            Document::Script(_) => true,
        }
    }

    /// Full device path, `None` while the document has no name.
    pub fn path(&self) -> Option<String> {
        join_path(self.dir_name(), self.file_name())
    }
}
