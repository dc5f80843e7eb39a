use edublocks_core::DiagramDocument;

/// Directly edited text about to be replaced by a fresh compile.
///
/// This is a warning, not a conflict to resolve: the diagram always wins and
/// the user is told what was lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    /// Text that carried the direct edit.
    pub discarded: String,
    /// Compiler output replacing it.
    pub replacement: String,
}

impl Divergence {
    /// Detects whether replacing the generated text of `doc` with `incoming`
    /// drops an independent text edit.
    pub fn detect(doc: &DiagramDocument, incoming: &str) -> Option<Self> {
        if doc.text_is_clean {
            return None;
        }
        match doc.generated_text.as_deref() {
            Some(current) if current == incoming => None,
            current => Some(Self {
                discarded: current.unwrap_or_default().to_string(),
                replacement: incoming.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagram(text: &str, clean: bool) -> DiagramDocument {
        DiagramDocument {
            dir_name: Some("/user".into()),
            file_name: Some("demo.xml".into()),
            diagram_source: Some("<xml/>".into()),
            generated_text: Some(text.into()),
            text_is_clean: clean,
        }
    }

    #[test]
    fn clean_text_never_diverges() {
        assert_eq!(Divergence::detect(&diagram("print(1)\n", true), "print(3)\n"), None);
    }

    #[test]
    fn dirty_text_replaced_by_other_text_diverges() {
        let found = Divergence::detect(&diagram("print(2)\n", false), "print(3)\n").unwrap();
        assert_eq!(found.discarded, "print(2)\n");
        assert_eq!(found.replacement, "print(3)\n");
    }

    #[test]
    fn dirty_text_matching_compile_is_not_lost() {
        assert_eq!(Divergence::detect(&diagram("print(2)\n", false), "print(2)\n"), None);
    }
}
