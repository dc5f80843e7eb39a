//! Which editing surface is shown, coupled to the kind of the open document.

use edublocks_core::{Document, DocumentKind};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::log_translations::LogMessage;
use super::Workspace;
use crate::error::{Refusal, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Block canvas.
    Diagram,
    /// Text editor.
    Text,
}

impl ViewMode {
    pub const ALL: [ViewMode; 2] = [ViewMode::Diagram, ViewMode::Text];

    /// Surface matching a freshly opened or renamed document.
    pub fn for_kind(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Diagram => ViewMode::Diagram,
            DocumentKind::Script => ViewMode::Text,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Diagram => ViewMode::Text,
            ViewMode::Text => ViewMode::Diagram,
        }
    }
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::Diagram
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Diagram => write!(f, "blocks"),
            ViewMode::Text => write!(f, "python"),
        }
    }
}

/// Checks that `mode` can show `doc`. Scripts have no diagram to show.
pub fn check_view(mode: ViewMode, doc: &Document) -> std::result::Result<ViewMode, Refusal> {
    match (mode, doc) {
        (ViewMode::Diagram, Document::Script(_)) => Err(Refusal::DiagramViewUnavailable),
        _ => Ok(mode),
    }
}

impl Workspace {
    pub fn set_view(&mut self, mode: ViewMode) -> Result<()> {
        match check_view(mode, self.engine.document()) {
            Ok(mode) => {
                if self.view_mode != mode {
                    self.view_mode = mode;
                    self.notify(LogMessage::ViewSwitched, vec![mode.to_string()]);
                }
                Ok(())
            }
            Err(refusal) => Err(self.refuse(refusal)),
        }
    }

    pub fn toggle_view(&mut self) -> Result<()> {
        self.set_view(self.view_mode.toggled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edublocks_core::DiagramDocument;

    #[test]
    fn script_refuses_diagram_view() {
        let doc = Document::from_contents(DocumentKind::Script, "/user", "a.py", "");
        assert_eq!(
            check_view(ViewMode::Diagram, &doc),
            Err(Refusal::DiagramViewUnavailable)
        );
        assert_eq!(check_view(ViewMode::Text, &doc), Ok(ViewMode::Text));
    }

    #[test]
    fn diagram_allows_both_views() {
        let doc = Document::Diagram(DiagramDocument::empty(None));
        for mode in ViewMode::ALL {
            assert_eq!(check_view(mode, &doc), Ok(mode));
        }
    }

    #[test]
    fn toggling_twice_is_identity() {
        for mode in ViewMode::ALL {
            assert_eq!(mode.toggled().toggled(), mode);
            assert_ne!(mode.toggled(), mode);
        }
    }
}
