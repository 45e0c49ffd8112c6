//! Transient "just completed" display timers.

use std::collections::HashMap;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::domain::EventKey;

/// How long a completed attempt stays flagged as just completed.
pub const DEFAULT_CONFIRMATION_DISPLAY: Duration = Duration::from_secs(1);

/// Pending display timers of one session, plus its dismissed flag.
///
/// Both live behind the same lock so that raising a flag and scheduling its
/// clear can never interleave with dismissal.
#[derive(Debug, Default)]
pub(crate) struct DisplayTimers {
    dismissed: bool,
    handles: HashMap<EventKey, JoinHandle<()>>,
}

impl DisplayTimers {
    pub(crate) fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Track the clear task for `key`, replacing any earlier one.
    pub(crate) fn schedule(&mut self, key: EventKey, handle: JoinHandle<()>) {
        if let Some(previous) = self.handles.insert(key, handle) {
            previous.abort();
        }
    }

    /// Forget the clear task for `key` once it has run.
    pub(crate) fn finish(&mut self, key: &EventKey) {
        self.handles.remove(key);
    }

    /// Mark dismissed and abort every pending clear. Returns how many were
    /// cancelled, or `None` if the session was already dismissed.
    pub(crate) fn dismiss(&mut self) -> Option<usize> {
        if self.dismissed {
            return None;
        }
        self.dismissed = true;
        Some(self.abort_all())
    }

    pub(crate) fn abort_all(&mut self) -> usize {
        let count = self.handles.len();
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
        count
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.handles.len()
    }
}
