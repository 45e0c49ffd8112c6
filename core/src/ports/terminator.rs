//! Process terminator port (interface).

use crate::domain::TerminationOutcome;
use crate::error::Result;

/// Port for terminating one exact process instance.
///
/// Implementations kill the process identified by `pid` only if it is still
/// the instance described by `generation`. Latency is unknown: callers must
/// not assume the call completes synchronously or quickly.
///
/// An `Err` means the attempt could not be made at all (I/O failure,
/// unsupported platform). The coordinator records it as a failed attempt.
pub trait ProcessTerminatorPort: Send + Sync + 'static {
    /// Attempt to kill the process instance `(pid, generation)`.
    fn terminate(
        &self,
        pid: u32,
        generation: u64,
    ) -> impl std::future::Future<Output = Result<TerminationOutcome>> + Send;
}
