//! Kill-on-startup event domain model.

use serde::{Deserialize, Serialize};

// ============================================================================
// EventKey
// ============================================================================

/// Identity of one OS process instance.
///
/// The PID alone is not enough: the generation token distinguishes this
/// instance from any later process that reuses the same PID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventKey {
    /// Process ID.
    pub pid: u32,
    /// Generation token for this process instance.
    pub generation: u64,
}

impl EventKey {
    pub fn new(pid: u32, generation: u64) -> Self {
        Self { pid, generation }
    }
}

impl std::fmt::Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.pid, self.generation)
    }
}

// ============================================================================
// KillEvent
// ============================================================================

/// A process that was allowed to start before policy finished loading.
///
/// Immutable for the lifetime of a session. The grace period is a fixed
/// gate; it does not count down.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillEvent {
    /// Path of the executable on disk.
    pub process_path: String,
    /// Process ID.
    pub pid: u32,
    /// Generation token of the process instance.
    pub generation: u64,
    /// Seconds during which termination is offered. Zero disables it.
    #[serde(rename = "gracePeriodSeconds")]
    pub grace_period_secs: u64,
}

impl KillEvent {
    /// Create a new event.
    pub fn new(
        process_path: impl Into<String>,
        pid: u32,
        generation: u64,
        grace_period_secs: u64,
    ) -> Self {
        Self {
            process_path: process_path.into(),
            pid,
            generation,
            grace_period_secs,
        }
    }

    /// The process instance this event refers to.
    pub fn key(&self) -> EventKey {
        EventKey::new(self.pid, self.generation)
    }

    /// Whether the user may request termination of this event at all.
    pub fn is_actionable(&self) -> bool {
        self.grace_period_secs > 0
    }
}

impl std::fmt::Display for KillEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (PID: {}, Generation: {}, Grace Period: {})",
            self.process_path, self.pid, self.generation, self.grace_period_secs
        )
    }
}

// ============================================================================
// KillEventInput
// ============================================================================

/// JSON representation of an event as handed over by the host.
///
/// The grace period may be omitted, in which case the configured default
/// applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillEventInput {
    pub process_path: String,
    pub pid: u32,
    pub generation: u64,
    #[serde(default)]
    pub grace_period_seconds: Option<u64>,
}

impl KillEventInput {
    /// Resolve into a domain event, falling back to `default_grace_secs`.
    pub fn into_event(self, default_grace_secs: u64) -> KillEvent {
        KillEvent::new(
            self.process_path,
            self.pid,
            self.generation,
            self.grace_period_seconds.unwrap_or(default_grace_secs),
        )
    }
}
