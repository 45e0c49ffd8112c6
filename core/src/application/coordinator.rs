//! Kill-on-startup termination coordinator.
//!
//! A [`TerminationCoordinator`] hands out one [`Session`] per displayed
//! window. The session owns the ordered list of flagged events and a small
//! state machine per event:
//!
//! ```text
//! Pending --(CAS)--> InFlight --(terminator result)--> Confirmed(success)
//! ```
//!
//! `Confirmed` is terminal. The compare-and-set on each event's watch
//! channel guarantees the terminator runs at most once per event; every
//! other caller waits on the same channel for the winner's result.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{EventKey, EventView, KillEvent, TerminationOutcome, TerminationState};
use crate::error::{Error, Result};
use crate::ports::ProcessTerminatorPort;

use super::display::{DisplayTimers, DEFAULT_CONFIRMATION_DISPLAY};

// ============================================================================
// Per-event state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    InFlight,
    Confirmed { success: bool },
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    phase: Phase,
    just_completed: bool,
    outcome: Option<TerminationOutcome>,
}

impl Cell {
    const PENDING: Cell = Cell {
        phase: Phase::Pending,
        just_completed: false,
        outcome: None,
    };

    /// In-flight is reported as pending; observers only see three states.
    fn state(&self) -> TerminationState {
        match self.phase {
            Phase::Confirmed { success } => TerminationState::Confirmed { success },
            Phase::Pending | Phase::InFlight => TerminationState::Pending,
        }
    }
}

struct EventSlot {
    event: KillEvent,
    cell: watch::Sender<Cell>,
}

impl EventSlot {
    fn view(&self) -> EventView {
        let cell = *self.cell.borrow();
        EventView::new(&self.event, cell.state(), cell.just_completed, cell.outcome)
    }
}

// ============================================================================
// TerminationCoordinator
// ============================================================================

/// Application service that starts termination sessions.
///
/// The terminator is injected so tests can substitute a fake.
pub struct TerminationCoordinator<T: ProcessTerminatorPort> {
    terminator: Arc<T>,
    confirmation_display: Duration,
}

impl<T: ProcessTerminatorPort> TerminationCoordinator<T> {
    /// Create a coordinator with the given terminator.
    pub fn new(terminator: T) -> Self {
        Self::from_arc(Arc::new(terminator))
    }

    /// Create a coordinator sharing an existing terminator.
    pub fn from_arc(terminator: Arc<T>) -> Self {
        Self {
            terminator,
            confirmation_display: DEFAULT_CONFIRMATION_DISPLAY,
        }
    }

    /// Create a coordinator using the display settings from `config`.
    pub fn from_config(terminator: T, config: &Config) -> Self {
        Self::new(terminator).with_confirmation_display(config.confirmation_display())
    }

    /// Set how long `just_completed` stays raised after an attempt.
    pub fn with_confirmation_display(mut self, display: Duration) -> Self {
        self.confirmation_display = display;
        self
    }

    /// Start a session over `events`, preserving their order.
    ///
    /// Fails with [`Error::DuplicateEvent`] if two events share the same
    /// `(pid, generation)`. Events with the same path but different
    /// generations are distinct.
    pub fn start_session(&self, events: impl IntoIterator<Item = KillEvent>) -> Result<Session<T>> {
        let mut slots = Vec::new();
        let mut index = HashMap::new();

        for event in events {
            let key = event.key();
            if index.insert(key, slots.len()).is_some() {
                return Err(Error::DuplicateEvent {
                    pid: key.pid,
                    generation: key.generation,
                });
            }
            let (cell, _) = watch::channel(Cell::PENDING);
            slots.push(EventSlot { event, cell });
        }

        let (revision, _) = watch::channel(0);
        let inner = SessionInner {
            id: Uuid::new_v4(),
            terminator: Arc::clone(&self.terminator),
            confirmation_display: self.confirmation_display,
            slots,
            index,
            timers: Mutex::new(DisplayTimers::default()),
            revision,
        };
        debug!(session = %inner.id, events = inner.slots.len(), "Session started");

        Ok(Session {
            inner: Arc::new(inner),
        })
    }
}

// ============================================================================
// Session
// ============================================================================

struct SessionInner<T> {
    id: Uuid,
    terminator: Arc<T>,
    confirmation_display: Duration,
    slots: Vec<EventSlot>,
    index: HashMap<EventKey, usize>,
    timers: Mutex<DisplayTimers>,
    revision: watch::Sender<u64>,
}

impl<T> Drop for SessionInner<T> {
    fn drop(&mut self) {
        self.timers.get_mut().abort_all();
    }
}

/// One window's worth of kill-on-startup events.
///
/// Cheap to clone; clones share state. Presentation layers observe it
/// through [`Session::snapshot`] or [`Session::subscribe`] and mutate it only
/// through [`Session::request_termination`] and [`Session::dismiss`].
pub struct Session<T> {
    inner: Arc<SessionInner<T>>,
}

impl<T> Clone for Session<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ProcessTerminatorPort> Session<T> {
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }

    pub fn is_dismissed(&self) -> bool {
        self.inner.timers.lock().is_dismissed()
    }

    /// Current projection of every event, in display order.
    pub fn snapshot(&self) -> Vec<EventView> {
        self.inner.slots.iter().map(EventSlot::view).collect()
    }

    /// Current projection of one event.
    pub fn view(&self, pid: u32, generation: u64) -> Option<EventView> {
        self.inner
            .slot(EventKey::new(pid, generation))
            .map(|(_, slot)| slot.view())
    }

    /// Revision counter bumped on every visible state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Terminate the process instance `(pid, generation)`.
    ///
    /// Returns the confirmed state. Repeated or concurrent calls for the same
    /// event never reach the terminator twice; they return the recorded
    /// result. Events with a zero grace period fail with
    /// [`Error::GracePeriodExpiredOrDisabled`] and stay pending.
    pub async fn request_termination(&self, pid: u32, generation: u64) -> Result<TerminationState> {
        let idx = match SessionInner::claim(&self.inner, EventKey::new(pid, generation))? {
            Claim::Dispatch(idx) => {
                SessionInner::dispatch(&self.inner, idx);
                idx
            }
            Claim::Wait(idx) => idx,
        };
        let slot = &self.inner.slots[idx];

        let mut rx = slot.cell.subscribe();
        let phase = {
            let cell = rx
                .wait_for(|cell| matches!(cell.phase, Phase::Confirmed { .. }))
                .await
                .map_err(|_| Error::SessionClosed)?;
            cell.phase
        };

        match phase {
            Phase::Confirmed { success } => Ok(TerminationState::Confirmed { success }),
            Phase::Pending | Phase::InFlight => Err(Error::SessionClosed),
        }
    }

    /// Run [`Session::request_termination`] on the runtime so an interactive
    /// caller does not block on the external kill.
    pub fn spawn_termination(
        &self,
        pid: u32,
        generation: u64,
    ) -> JoinHandle<Result<TerminationState>> {
        let session = self.clone();
        tokio::spawn(async move { session.request_termination(pid, generation).await })
    }

    /// Close the session.
    ///
    /// New requests fail with [`Error::SessionClosed`]. Pending display
    /// timers are cancelled and raised flags cleared. Terminations already
    /// in flight still run to completion and record their result.
    pub fn dismiss(&self) {
        let mut timers = self.inner.timers.lock();
        let Some(cancelled) = timers.dismiss() else {
            return;
        };
        for slot in &self.inner.slots {
            slot.cell
                .send_if_modified(|cell| std::mem::replace(&mut cell.just_completed, false));
        }
        drop(timers);

        info!(session = %self.inner.id, cancelled, "Session dismissed");
        self.inner.bump();
    }
}

impl<T> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("events", &self.inner.slots.len())
            .finish()
    }
}

impl<T> SessionInner<T> {
    fn slot(&self, key: EventKey) -> Option<(usize, &EventSlot)> {
        let idx = *self.index.get(&key)?;
        Some((idx, &self.slots[idx]))
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}

/// What a request should do after validation.
enum Claim {
    /// This caller won the compare-and-set and must dispatch.
    Dispatch(usize),
    /// Another caller owns (or owned) the attempt; wait for its result.
    Wait(usize),
}

impl<T: ProcessTerminatorPort> SessionInner<T> {
    /// Validate a request and compare-and-set `Pending -> InFlight`.
    ///
    /// Runs under the timers lock so it cannot interleave with dismissal.
    fn claim(this: &Arc<Self>, key: EventKey) -> Result<Claim> {
        let timers = this.timers.lock();
        if timers.is_dismissed() {
            return Err(Error::SessionClosed);
        }

        let (idx, slot) = this.slot(key).ok_or(Error::UnknownEvent {
            pid: key.pid,
            generation: key.generation,
        })?;

        let mut claimed = false;
        let mut disabled = false;
        slot.cell.send_if_modified(|cell| match cell.phase {
            Phase::Pending if !slot.event.is_actionable() => {
                disabled = true;
                false
            }
            Phase::Pending => {
                cell.phase = Phase::InFlight;
                claimed = true;
                true
            }
            Phase::InFlight | Phase::Confirmed { .. } => false,
        });
        drop(timers);

        if disabled {
            return Err(Error::GracePeriodExpiredOrDisabled {
                pid: key.pid,
                generation: key.generation,
            });
        }
        if claimed {
            debug!(session = %this.id, event = %key, "Claimed event for termination");
            Ok(Claim::Dispatch(idx))
        } else {
            Ok(Claim::Wait(idx))
        }
    }

    /// Call the terminator for a claimed event on a background task.
    ///
    /// The task is detached from the caller so a dropped request cannot
    /// leave the event stuck in flight.
    fn dispatch(this: &Arc<Self>, idx: usize) {
        let inner = Arc::clone(this);
        let event = &this.slots[idx].event;
        let span = info_span!(
            "terminate",
            session = %this.id,
            pid = event.pid,
            generation = event.generation
        );

        tokio::spawn(
            async move {
                let guard = CompletionGuard {
                    inner: Some(Arc::clone(&inner)),
                    idx,
                };
                let event = &inner.slots[idx].event;
                debug!(path = %event.process_path, "Dispatching termination");
                let result = inner.terminator.terminate(event.pid, event.generation).await;
                guard.disarm();
                SessionInner::complete(&inner, idx, result);
            }
            .instrument(span),
        );
    }

    /// Record the terminal state of an event and raise its display flag.
    fn complete(this: &Arc<Self>, idx: usize, result: Result<TerminationOutcome>) {
        let slot = &this.slots[idx];
        let key = slot.event.key();
        let (success, outcome) = match result {
            Ok(outcome) => {
                info!(session = %this.id, event = %key, %outcome, "Termination finished");
                (outcome.is_success(), Some(outcome))
            }
            Err(e) => {
                warn!(session = %this.id, event = %key, error = %e, "Termination attempt failed");
                (false, None)
            }
        };

        let mut timers = this.timers.lock();
        let announce = !timers.is_dismissed();
        slot.cell.send_modify(|cell| {
            cell.phase = Phase::Confirmed { success };
            cell.outcome = outcome;
            cell.just_completed = announce;
        });

        if announce {
            let handle = tokio::spawn(clear_after(
                Arc::downgrade(this),
                idx,
                this.confirmation_display,
            ));
            timers.schedule(key, handle);
        } else {
            warn!(session = %this.id, event = %key, "Session dismissed, dropping late result");
        }
        drop(timers);

        this.bump();
    }
}

/// Lower the `just_completed` flag of one event after `delay`.
///
/// Holds only a weak reference while sleeping; if the session is gone by
/// then, there is nothing to clear.
async fn clear_after<T>(session: Weak<SessionInner<T>>, idx: usize, delay: Duration) {
    tokio::time::sleep(delay).await;

    let Some(inner) = session.upgrade() else {
        return;
    };
    let slot = &inner.slots[idx];

    let mut timers = inner.timers.lock();
    timers.finish(&slot.event.key());
    let cleared = slot
        .cell
        .send_if_modified(|cell| std::mem::replace(&mut cell.just_completed, false));
    drop(timers);

    if cleared {
        inner.bump();
    }
}

/// Records a failed attempt if the terminator task unwinds before
/// completing, so waiters are never left hanging on an in-flight event.
struct CompletionGuard<T: ProcessTerminatorPort> {
    inner: Option<Arc<SessionInner<T>>>,
    idx: usize,
}

impl<T: ProcessTerminatorPort> CompletionGuard<T> {
    fn disarm(mut self) {
        self.inner = None;
    }
}

impl<T: ProcessTerminatorPort> Drop for CompletionGuard<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            SessionInner::complete(
                &inner,
                self.idx,
                Err(Error::KillFailed {
                    pid: inner.slots[self.idx].event.pid,
                    reason: "terminator task aborted".to_string(),
                }),
            );
        }
    }
}
