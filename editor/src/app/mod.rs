pub mod dispatcher;
pub mod log_translations;
pub mod navigation;
pub mod prompt;
pub mod view;

mod actions;
mod state;

pub use dispatcher::{DispatchError, Dispatcher, Intent, Reply};
pub use log_translations::{format_log, LogMessage};
pub use navigation::{visible_entries, DirectoryState};
pub use prompt::{ScriptedPrompt, UserPrompt};
pub use state::{ConnectionStatus, LogEntry, LogLevel, Snapshot, Workspace};
pub use view::{check_view, ViewMode};

/// Serializes log entries as a JSON array.
pub fn log_to_json(entries: &[LogEntry]) -> serde_json::Result<String> {
    let items: Vec<serde_json::Value> = entries
        .iter()
        .map(|e| {
            serde_json::json!({
                "level": e.level.to_string(),
                "message_key": format!("{:?}", e.message_key),
                "args": e.args,
                "message": format_log(e),
                "timestamp": e.timestamp.to_rfc3339(),
            })
        })
        .collect();
    serde_json::to_string_pretty(&items)
}
