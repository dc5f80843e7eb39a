use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Reporting and prompting capability handed to the workspace in place of
/// global dialogs.
pub trait UserPrompt: Send + Sync {
    /// Shows a message the user has to acknowledge.
    fn report(&mut self, message: &str);
    /// Asks for a file name. `None` when the user cancels.
    fn prompt_filename(&mut self) -> Option<String>;
}

/// Prompt replaying queued answers and recording every report.
///
/// Clones share their state, so a test can keep one handle while the
/// workspace owns another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: Arc<Mutex<VecDeque<Option<String>>>>,
    reports: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the answer to the next filename prompt.
    pub fn answer(&self, name: Option<&str>) -> &Self {
        self.answers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(name.map(str::to_string));
        self
    }

    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl UserPrompt for ScriptedPrompt {
    fn report(&mut self, message: &str) {
        self.reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }

    fn prompt_filename(&mut self) -> Option<String> {
        self.answers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .flatten()
    }
}
