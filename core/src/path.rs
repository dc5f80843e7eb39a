//! Device path helpers. Paths are `/`-rooted strings, not host paths.

use crate::document::DocumentKind;

pub const SEPARATOR: char = '/';
pub const ROOT: &str = "/";

/// Joins a directory and a name with a single separator.
///
/// Returns `None` if either side is missing.
pub fn join_path(dir: Option<&str>, name: Option<&str>) -> Option<String> {
    let (dir, name) = (dir?, name?);
    Some(collapse_separators(&format!("{dir}{SEPARATOR}{name}")))
}

/// Classifies a file name by exact, case-sensitive suffix.
pub fn classify(name: &str) -> Option<DocumentKind> {
    DocumentKind::ALL
        .into_iter()
        .find(|kind| name.ends_with(kind.suffix()))
}

/// Drops the last segment of `path`. The root is its own parent.
pub fn parent_dir(path: &str) -> String {
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(0) | None => ROOT.to_string(),
        Some(idx) => trimmed[..idx].to_string(),
    }
}

/// Last segment of `path`.
pub fn file_name(path: &str) -> &str {
    path.rsplit(SEPARATOR).next().unwrap_or(path)
}

fn collapse_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_sep = false;
    for ch in path.chars() {
        if ch == SEPARATOR {
            if prev_sep {
                continue;
            }
            prev_sep = true;
        } else {
            prev_sep = false;
        }
        out.push(ch);
    }
    out
}
