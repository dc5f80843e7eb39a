use std::fmt;

pub type DataHandler = Box<dyn Fn(&str) + Send + Sync>;
pub type OpenHandler = Box<dyn Fn() + Send + Sync>;

/// Event listeners of a transport. Holds at most one handler per event kind.
#[derive(Default)]
pub struct Subscriptions {
    data: Option<DataHandler>,
    open: Option<OpenHandler>,
}

impl fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriptions")
            .field("data", &self.data.is_some())
            .field("open", &self.open.is_some())
            .finish()
    }
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if an earlier data handler was replaced.
    pub fn set_data(&mut self, handler: DataHandler) -> bool {
        let replaced = self.data.replace(handler).is_some();
        if replaced {
            tracing::debug!("replaced data handler");
        }
        replaced
    }

    /// Returns `true` if an earlier open handler was replaced.
    pub fn set_open(&mut self, handler: OpenHandler) -> bool {
        let replaced = self.open.replace(handler).is_some();
        if replaced {
            tracing::debug!("replaced open handler");
        }
        replaced
    }

    pub fn emit_data(&self, data: &str) {
        if let Some(handler) = &self.data {
            handler(data);
        }
    }

    pub fn emit_open(&self) {
        if let Some(handler) = &self.open {
            handler();
        }
    }
}
