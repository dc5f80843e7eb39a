//! Block compiler: turns a block diagram (Blockly XML) into script text.
//!
//! Compilation is one-directional and deterministic. There is no parser going
//! the other way.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

mod generators;

pub use generators::{default_generators, Fields, Generator};

/// Anything able to produce script text from a diagram.
pub trait BlockCompiler {
    fn compile(&self, diagram_source: &str) -> String;
}

impl<F> BlockCompiler for F
where
    F: Fn(&str) -> String,
{
    fn compile(&self, diagram_source: &str) -> String {
        self(diagram_source)
    }
}

static BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<block\b[^>]*?\btype="([^"]*)"[^>]*>"#).expect("block pattern")
});

static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<field\s+name="([^"]*)"\s*>([^<]*)</field>"#).expect("field pattern")
});

/// Compiler driven by a table of per-block generators.
///
/// Blocks are emitted in document order, which follows the statement chain
/// of the diagram. Fields of a block are the `<field>` elements found before
/// the next block starts.
#[derive(Clone)]
pub struct TableCompiler {
    generators: HashMap<String, Generator>,
}

impl fmt::Debug for TableCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.generators.keys().collect();
        names.sort();
        f.debug_struct("TableCompiler").field("generators", &names).finish()
    }
}

impl Default for TableCompiler {
    fn default() -> Self {
        Self {
            generators: default_generators(),
        }
    }
}

impl TableCompiler {
    /// Compiler without any generator. Every block renders as unsupported.
    pub fn empty() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    pub fn with_generator(mut self, block_type: impl Into<String>, generator: Generator) -> Self {
        self.generators.insert(block_type.into(), generator);
        self
    }

    pub fn supports(&self, block_type: &str) -> bool {
        self.generators.contains_key(block_type)
    }

    fn render(&self, block_type: &str, fields: &Fields) -> String {
        match self.generators.get(block_type) {
            Some(generator) => generator(fields),
            None => {
                tracing::warn!(block_type, "no generator for block");
                format!("# unsupported block: {block_type}\n")
            }
        }
    }
}

impl BlockCompiler for TableCompiler {
    fn compile(&self, diagram_source: &str) -> String {
        let starts: Vec<_> = BLOCK_RE.captures_iter(diagram_source).collect();
        let mut output = String::new();
        for (idx, caps) in starts.iter().enumerate() {
            let (Some(tag), Some(block_type)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let end = starts
                .get(idx + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(diagram_source.len());
            let body = &diagram_source[tag.end()..end];
            let fields: Fields = FIELD_RE
                .captures_iter(body)
                .map(|f| (f[1].to_string(), unescape(&f[2])))
                .collect();
            output.push_str(&self.render(block_type.as_str(), &fields));
        }
        output
    }
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    const DEMO: &str = r#"<xml xmlns="http://www.w3.org/1999/xhtml">
  <block type="import_oled" id="a" x="10" y="10">
    <next>
      <block type="oled_printLine" id="b">
        <field name="text">'Hi &amp; bye'</field>
        <field name="line">2</field>
      </block>
    </next>
  </block>
</xml>"#;

    #[test]
    fn compiles_statement_chain_in_order() {
        let text = TableCompiler::default().compile(DEMO);
        assert_eq!(text, "import oled\noled.printLine('Hi & bye', 2)\n");
    }

    #[test]
    fn empty_diagram_yields_empty_text() {
        let compiler = TableCompiler::default();
        assert_eq!(compiler.compile(""), "");
        assert_eq!(compiler.compile("<xml/>"), "");
        assert_eq!(compiler.compile("<xml></xml>"), "");
    }

    #[test]
    #[traced_test]
    fn unknown_block_is_marked() {
        let text = TableCompiler::default().compile(r#"<xml><block type="servo"/></xml>"#);
        assert_eq!(text, "# unsupported block: servo\n");
        assert!(logs_contain("no generator for block"));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let text = TableCompiler::default().compile(r#"<xml><block type="oled_printLine"></block></xml>"#);
        assert_eq!(text, "oled.printLine('Hello World!', 0)\n");
    }

    #[test]
    fn closures_are_compilers() {
        let upper = |src: &str| src.to_uppercase();
        assert_eq!(upper.compile("abc"), "ABC");
    }

    #[test]
    fn custom_generator_overrides_table() {
        fn beep(_: &Fields) -> String {
            "beep()\n".into()
        }
        let compiler = TableCompiler::empty().with_generator("import_oled", beep);
        assert!(compiler.supports("import_oled"));
        assert!(!compiler.supports("oled_printLine"));
        assert_eq!(compiler.compile(r#"<block type="import_oled"/>"#), "beep()\n");
    }
}
