use ::config::{Config, ConfigError, Environment, Map};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "EDUBLOCKS";

/// Placeholder substituted with the script path in [`EditorConfig::run_template`].
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Product policy of the editor, read from `EDUBLOCKS_*` variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Home directory of new documents and of the file browser.
    pub user_dir: String,
    pub samples_dir: String,
    /// Re-home files opened from `samples_dir` into `user_dir`.
    pub relocate_samples: bool,
    /// Never shown in listings.
    pub boot_file: String,
    /// REPL line that executes a saved script.
    pub run_template: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            user_dir: "/user".into(),
            samples_dir: "/samples".into(),
            relocate_samples: true,
            boot_file: "boot.py".into(),
            run_template: "exec(open('{path}').read())".into(),
        }
    }
}

impl EditorConfig {
    /// Reads the process environment, falling back to defaults on any error.
    pub fn from_env() -> Self {
        Self::load(None).unwrap_or_else(|err| {
            tracing::warn!(%err, "invalid editor configuration, using defaults");
            Self::default()
        })
    }

    /// Reads configuration from `vars` instead of the process environment.
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, ConfigError> {
        Self::load(Some(vars))
    }

    fn load(vars: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?
            .try_deserialize()
    }

    /// REPL line executing the script saved at `path`. The path is escaped so
    /// it stays a single Python string literal inside the template.
    pub fn run_instruction(&self, path: &str) -> String {
        self.run_template
            .replace(PATH_PLACEHOLDER, &escape_python_literal(path))
    }
}

/// Backslash-escapes `text` for use between Python quotes of either kind.
fn escape_python_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_variables_use_defaults() {
        let cfg = EditorConfig::from_vars(Map::new()).unwrap();
        assert_eq!(cfg, EditorConfig::default());
    }

    #[test]
    fn variables_override_defaults() {
        let cfg = EditorConfig::from_vars(vars(&[
            ("EDUBLOCKS_USER_DIR", "/home"),
            ("EDUBLOCKS_RELOCATE_SAMPLES", "false"),
        ]))
        .unwrap();
        assert_eq!(cfg.user_dir, "/home");
        assert!(!cfg.relocate_samples);
        assert_eq!(cfg.samples_dir, "/samples");
    }

    #[test]
    fn run_instruction_references_path() {
        let cfg = EditorConfig::default();
        assert_eq!(
            cfg.run_instruction("/user/main.py"),
            "exec(open('/user/main.py').read())"
        );
    }

    #[test]
    fn run_instruction_escapes_quotes_and_backslashes() {
        let cfg = EditorConfig::default();
        assert_eq!(
            cfg.run_instruction("/user/it's.py"),
            r"exec(open('/user/it\'s.py').read())"
        );
        assert_eq!(
            cfg.run_instruction(r#"/user/a\b"c.py"#),
            r#"exec(open('/user/a\\b\"c.py').read())"#
        );
    }
}
