//! End-to-end behaviour of termination sessions against a fake terminator.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use killonstart_core::{
    Error, EventStatus, KillEvent, ProcessTerminatorPort, Result, Session,
    TerminationCoordinator, TerminationOutcome, TerminationState,
};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

#[derive(Default)]
struct FakeTerminator {
    calls: AtomicUsize,
    seen: Mutex<Vec<(u32, u64)>>,
    outcomes: HashMap<u32, TerminationOutcome>,
    failing: Vec<u32>,
    panicking: Vec<u32>,
    gate: Option<Semaphore>,
}

impl FakeTerminator {
    fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    fn with_outcome(mut self, pid: u32, outcome: TerminationOutcome) -> Self {
        self.outcomes.insert(pid, outcome);
        self
    }

    fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProcessTerminatorPort for FakeTerminator {
    async fn terminate(&self, pid: u32, generation: u64) -> Result<TerminationOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push((pid, generation));
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.expect("gate closed");
        }
        if self.panicking.contains(&pid) {
            panic!("terminator blew up for {}", pid);
        }
        if self.failing.contains(&pid) {
            return Err(Error::KillFailed {
                pid,
                reason: "injected".to_string(),
            });
        }
        Ok(self
            .outcomes
            .get(&pid)
            .copied()
            .unwrap_or(TerminationOutcome::Terminated))
    }
}

fn start(
    terminator: &Arc<FakeTerminator>,
    events: Vec<KillEvent>,
) -> Session<FakeTerminator> {
    TerminationCoordinator::from_arc(Arc::clone(terminator))
        .start_session(events)
        .unwrap()
}

async fn wait_for_calls(terminator: &FakeTerminator, n: usize) {
    while terminator.calls() < n {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_at_most_once_under_concurrent_requests() {
    let terminator = Arc::new(FakeTerminator::gated());
    let session = start(&terminator, vec![KillEvent::new("/usr/bin/daemon", 500, 42, 30)]);

    let handles: Vec<_> = (0..1000)
        .map(|_| session.spawn_termination(500, 42))
        .collect();

    wait_for_calls(&terminator, 1).await;
    terminator.release(1);

    for handle in handles {
        let state = handle.await.unwrap().unwrap();
        assert_eq!(state, TerminationState::Confirmed { success: true });
    }
    assert_eq!(terminator.calls(), 1);
    assert_eq!(terminator.seen.lock().as_slice(), &[(500, 42)]);
}

#[tokio::test]
async fn test_zero_grace_never_dispatches() {
    let terminator = Arc::new(FakeTerminator::default());
    let session = start(&terminator, vec![KillEvent::new("/usr/bin/agent", 7, 1, 0)]);

    for _ in 0..10 {
        let result = session.request_termination(7, 1).await;
        assert!(matches!(
            result,
            Err(Error::GracePeriodExpiredOrDisabled { pid: 7, generation: 1 })
        ));
    }

    let view = session.view(7, 1).unwrap();
    assert_eq!(view.status, EventStatus::Pending);
    assert!(!view.just_completed);
    assert!(!view.is_closable());
    assert_eq!(terminator.calls(), 0);
}

#[tokio::test]
async fn test_sequential_requests_are_idempotent() {
    let terminator = Arc::new(FakeTerminator::default());
    let session = start(&terminator, vec![KillEvent::new("/usr/bin/agent", 7, 1, 15)]);

    let first = session.request_termination(7, 1).await.unwrap();
    let second = session.request_termination(7, 1).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(terminator.calls(), 1);
}

#[tokio::test]
async fn test_events_terminate_independently() {
    let terminator = Arc::new(
        FakeTerminator::gated().with_outcome(2, TerminationOutcome::NotFound),
    );
    let session = start(
        &terminator,
        vec![
            KillEvent::new("/usr/bin/one", 1, 1, 10),
            KillEvent::new("/usr/bin/two", 2, 1, 10),
        ],
    );

    let one = session.spawn_termination(1, 1);
    let two = session.spawn_termination(2, 1);

    // Both attempts are in flight at the same time.
    wait_for_calls(&terminator, 2).await;
    terminator.release(2);

    assert_eq!(
        one.await.unwrap().unwrap(),
        TerminationState::Confirmed { success: true }
    );
    assert_eq!(
        two.await.unwrap().unwrap(),
        TerminationState::Confirmed { success: false }
    );

    let statuses: Vec<_> = session.snapshot().iter().map(|v| v.status).collect();
    assert_eq!(
        statuses,
        vec![EventStatus::ConfirmedSuccess, EventStatus::ConfirmedFailure]
    );
}

#[tokio::test]
async fn test_terminator_error_is_recorded_as_failure() {
    let terminator = Arc::new(FakeTerminator {
        failing: vec![3],
        ..FakeTerminator::default()
    });
    let session = start(&terminator, vec![KillEvent::new("/usr/bin/three", 3, 3, 10)]);

    let state = session.request_termination(3, 3).await.unwrap();
    assert_eq!(state, TerminationState::Confirmed { success: false });

    let view = session.view(3, 3).unwrap();
    assert_eq!(view.status, EventStatus::ConfirmedFailure);
    assert_eq!(view.outcome, None);
}

#[tokio::test]
async fn test_panicking_terminator_does_not_hang_waiters() {
    let terminator = Arc::new(FakeTerminator {
        panicking: vec![4],
        ..FakeTerminator::default()
    });
    let session = start(&terminator, vec![KillEvent::new("/usr/bin/four", 4, 4, 10)]);

    let state = session.request_termination(4, 4).await.unwrap();
    assert_eq!(state, TerminationState::Confirmed { success: false });
    assert_eq!(terminator.calls(), 1);
}

#[tokio::test]
async fn test_dismiss_rejects_new_requests() {
    let terminator = Arc::new(FakeTerminator::default());
    let session = start(&terminator, vec![KillEvent::new("/usr/bin/agent", 7, 1, 15)]);

    session.dismiss();
    session.dismiss();
    assert!(session.is_dismissed());

    assert!(matches!(
        session.request_termination(7, 1).await,
        Err(Error::SessionClosed)
    ));
    assert!(matches!(
        session.request_termination(999, 1).await,
        Err(Error::SessionClosed)
    ));
    assert_eq!(terminator.calls(), 0);
    assert_eq!(session.view(7, 1).unwrap().status, EventStatus::Pending);
}

#[tokio::test]
async fn test_in_flight_request_completes_after_dismiss() {
    let terminator = Arc::new(FakeTerminator::gated());
    let session = start(
        &terminator,
        vec![
            KillEvent::new("/usr/bin/one", 1, 1, 10),
            KillEvent::new("/usr/bin/two", 2, 1, 10),
        ],
    );

    let in_flight = session.spawn_termination(1, 1);
    wait_for_calls(&terminator, 1).await;

    session.dismiss();
    assert!(matches!(
        session.request_termination(2, 1).await,
        Err(Error::SessionClosed)
    ));

    terminator.release(1);
    let state = in_flight.await.unwrap().unwrap();
    assert_eq!(state, TerminationState::Confirmed { success: true });

    let view = session.view(1, 1).unwrap();
    assert_eq!(view.status, EventStatus::ConfirmedSuccess);
    assert!(!view.just_completed);
    assert_eq!(terminator.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_cancels_display_timers() {
    let terminator = Arc::new(FakeTerminator::default());
    let session = start(&terminator, vec![KillEvent::new("/usr/bin/agent", 7, 1, 15)]);

    session.request_termination(7, 1).await.unwrap();
    assert!(session.view(7, 1).unwrap().just_completed);

    session.dismiss();
    assert!(!session.view(7, 1).unwrap().just_completed);

    tokio::time::sleep(Duration::from_secs(5)).await;
    let view = session.view(7, 1).unwrap();
    assert!(!view.just_completed);
    assert_eq!(view.status, EventStatus::ConfirmedSuccess);
}

#[tokio::test(start_paused = true)]
async fn test_scenario_a_success_with_transient_flag() {
    let terminator = Arc::new(FakeTerminator::default());
    let session = start(&terminator, vec![KillEvent::new("/usr/local/bin/tool", 100, 9, 30)]);

    let state = session.request_termination(100, 9).await.unwrap();
    assert_eq!(state, TerminationState::Confirmed { success: true });

    let view = session.view(100, 9).unwrap();
    assert_eq!(view.status, EventStatus::ConfirmedSuccess);
    assert!(view.just_completed);
    assert_eq!(view.outcome, Some(TerminationOutcome::Terminated));

    tokio::time::sleep(Duration::from_millis(999)).await;
    assert!(session.view(100, 9).unwrap().just_completed);

    tokio::time::sleep(Duration::from_millis(2)).await;
    let view = session.view(100, 9).unwrap();
    assert!(!view.just_completed);
    assert_eq!(view.status, EventStatus::ConfirmedSuccess);
}

#[tokio::test]
async fn test_scenario_b_zero_grace() {
    let terminator = Arc::new(FakeTerminator::default());
    let session = start(&terminator, vec![KillEvent::new("/usr/local/bin/tool", 100, 9, 0)]);

    let result = session.request_termination(100, 9).await;
    assert!(matches!(result, Err(Error::GracePeriodExpiredOrDisabled { .. })));
    assert_eq!(session.view(100, 9).unwrap().status, EventStatus::Pending);
}

#[test]
fn test_scenario_c_same_path_distinct_generations() {
    let terminator = Arc::new(FakeTerminator::default());
    let session = start(
        &terminator,
        vec![
            KillEvent::new("/usr/local/bin/tool", 100, 1, 30),
            KillEvent::new("/usr/local/bin/tool", 100, 2, 30),
        ],
    );
    assert_eq!(session.len(), 2);
    assert!(session.view(100, 1).is_some());
    assert!(session.view(100, 2).is_some());
}

#[tokio::test]
async fn test_scenario_d_unknown_event() {
    let terminator = Arc::new(FakeTerminator::default());
    let session = start(
        &terminator,
        vec![
            KillEvent::new("/usr/local/bin/tool", 100, 1, 30),
            KillEvent::new("/usr/local/bin/other", 200, 1, 30),
        ],
    );
    let before = session.snapshot();

    let result = session.request_termination(100, 2).await;
    assert!(matches!(
        result,
        Err(Error::UnknownEvent { pid: 100, generation: 2 })
    ));
    assert_eq!(session.snapshot(), before);
    assert_eq!(terminator.calls(), 0);
}
