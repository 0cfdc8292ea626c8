//! Last-shown value bookkeeping for one display target.

use tracing::trace;

/// What the host should do after publishing a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    /// The display text changed; the host writes it and its own change
    /// notification reaches dependents.
    Changed,
    /// Same text as last time. Writing it again raises no change on its own,
    /// so the host notifies dependents explicitly.
    Unchanged,
}

/// Remembers the formatted result last published to one target.
#[derive(Debug, Clone, Default)]
pub struct ResultSlot {
    current: Option<String>,
}

impl ResultSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn publish(&mut self, formatted: &str) -> Publish {
        if self.current.as_deref() == Some(formatted) {
            trace!(formatted, "result unchanged");
            Publish::Unchanged
        } else {
            self.current = Some(formatted.to_string());
            Publish::Changed
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
