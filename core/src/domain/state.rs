//! Termination state machine and its presentation projection.

use serde::{Deserialize, Serialize};

use super::KillEvent;

// ============================================================================
// TerminationOutcome
// ============================================================================

/// What the OS process-control layer reported for one kill attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TerminationOutcome {
    /// The exact process instance was killed.
    Terminated,
    /// No process with that PID and generation exists any more.
    NotFound,
    /// The caller is not allowed to signal the process.
    PermissionDenied,
}

impl TerminationOutcome {
    /// Whether this outcome counts as a successful termination.
    pub fn is_success(&self) -> bool {
        matches!(self, TerminationOutcome::Terminated)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TerminationOutcome::Terminated => "Terminated",
            TerminationOutcome::NotFound => "Not found",
            TerminationOutcome::PermissionDenied => "Permission denied",
        }
    }
}

impl std::fmt::Display for TerminationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// TerminationState
// ============================================================================

/// Per-event termination state.
///
/// `Confirmed` is terminal: an event is terminated at most once no matter
/// how often the request is repeated, and a failed attempt is never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum TerminationState {
    #[default]
    Pending,
    Confirmed { success: bool },
}

impl TerminationState {
    pub fn status(&self) -> EventStatus {
        match self {
            TerminationState::Pending => EventStatus::Pending,
            TerminationState::Confirmed { success: true } => EventStatus::ConfirmedSuccess,
            TerminationState::Confirmed { success: false } => EventStatus::ConfirmedFailure,
        }
    }
}

// ============================================================================
// EventView
// ============================================================================

/// Flattened status for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventStatus {
    Pending,
    ConfirmedSuccess,
    ConfirmedFailure,
}

impl EventStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            EventStatus::Pending => "Pending",
            EventStatus::ConfirmedSuccess => "Closed",
            EventStatus::ConfirmedFailure => "Failed",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Read-only projection of one event for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub process_path: String,
    pub pid: u32,
    pub generation: u64,
    #[serde(rename = "gracePeriodSeconds")]
    pub grace_period_secs: u64,
    pub status: EventStatus,
    /// Set for a short while after an attempt completes.
    pub just_completed: bool,
    /// Raw terminator outcome, if the attempt got one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<TerminationOutcome>,
}

impl EventView {
    pub fn new(
        event: &KillEvent,
        state: TerminationState,
        just_completed: bool,
        outcome: Option<TerminationOutcome>,
    ) -> Self {
        Self {
            process_path: event.process_path.clone(),
            pid: event.pid,
            generation: event.generation,
            grace_period_secs: event.grace_period_secs,
            status: state.status(),
            just_completed,
            outcome,
        }
    }

    /// Whether a "Close" control for this row should be enabled.
    pub fn is_closable(&self) -> bool {
        self.grace_period_secs > 0 && self.status == EventStatus::Pending
    }

    /// Final path component, for narrow layouts.
    pub fn process_name(&self) -> &str {
        self.process_path
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.process_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_success() {
        assert!(TerminationOutcome::Terminated.is_success());
        assert!(!TerminationOutcome::NotFound.is_success());
        assert!(!TerminationOutcome::PermissionDenied.is_success());
    }

    #[test]
    fn test_state_status() {
        assert_eq!(TerminationState::default().status(), EventStatus::Pending);
        assert_eq!(
            TerminationState::Confirmed { success: false }.status(),
            EventStatus::ConfirmedFailure
        );
    }

    #[test]
    fn test_closable() {
        let event = KillEvent::new("/bin/sleep", 5, 9, 0);
        let view = EventView::new(&event, TerminationState::Pending, false, None);
        assert!(!view.is_closable());

        let event = KillEvent::new("/bin/sleep", 5, 9, 10);
        let view = EventView::new(&event, TerminationState::Pending, false, None);
        assert!(view.is_closable());

        let view = EventView::new(
            &event,
            TerminationState::Confirmed { success: true },
            true,
            Some(TerminationOutcome::Terminated),
        );
        assert!(!view.is_closable());
    }

    #[test]
    fn test_process_name() {
        let event = KillEvent::new("/Applications/Foo.app/Contents/MacOS/Foo", 1, 1, 1);
        let view = EventView::new(&event, TerminationState::Pending, false, None);
        assert_eq!(view.process_name(), "Foo");

        let event = KillEvent::new("bare", 1, 1, 1);
        let view = EventView::new(&event, TerminationState::Pending, false, None);
        assert_eq!(view.process_name(), "bare");
    }
}
