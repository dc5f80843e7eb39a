use std::collections::HashMap;

/// Field values of a single block, keyed by field name.
pub type Fields = HashMap<String, String>;

/// Renders one block into script text, including its trailing newline.
pub type Generator = fn(&Fields) -> String;

fn field<'a>(fields: &'a Fields, name: &str, default: &'a str) -> &'a str {
    fields.get(name).map(String::as_str).unwrap_or(default)
}

fn import_oled(_: &Fields) -> String {
    "import oled\n".to_string()
}

fn oled_print_line(fields: &Fields) -> String {
    let text = field(fields, "text", "'Hello World!'");
    let line = field(fields, "line", "0");
    format!("oled.printLine({text}, {line})\n")
}

/// Generators for the bundled block set.
pub fn default_generators() -> HashMap<String, Generator> {
    let mut table: HashMap<String, Generator> = HashMap::new();
    table.insert("import_oled".into(), import_oled);
    table.insert("oled_printLine".into(), oled_print_line);
    table
}
