//! `SIGKILL` delivery shared by the Unix terminators.
//!
//! Callers check the generation token first and only then signal. Between the
//! check and `kill(2)` the process could exit and its PID be handed to a new
//! process, which would then receive the signal. Closing that window needs a
//! process handle (`pidfd_send_signal` on Linux), which nothing here holds; the
//! window is a single syscall wide and PID allocation is sequential, so a reuse
//! inside it requires the whole PID space to wrap in between.

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::domain::TerminationOutcome;
use crate::error::{Error, Result};

/// Convert `pid` into a signal target, rejecting values `kill(2)` would treat
/// as a process group or broadcast.
pub(super) fn signal_target(pid: u32) -> Option<Pid> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Some(Pid::from_raw(raw)),
        _ => None,
    }
}

/// Send `SIGKILL` to an already verified process.
pub(super) fn send_sigkill(target: Pid, generation: u64) -> Result<TerminationOutcome> {
    let pid = target.as_raw() as u32;
    match signal::kill(target, Signal::SIGKILL) {
        Ok(()) => {
            debug!(pid, generation, "SIGKILL sent successfully");
            Ok(TerminationOutcome::Terminated)
        }
        Err(Errno::ESRCH) => {
            debug!(pid, "Process exited before SIGKILL");
            Ok(TerminationOutcome::NotFound)
        }
        Err(Errno::EPERM) => {
            warn!(pid, "Permission denied to kill process");
            Ok(TerminationOutcome::PermissionDenied)
        }
        Err(errno) => Err(Error::KillFailed {
            pid,
            reason: errno.desc().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_target_rejects_group_and_broadcast() {
        assert_eq!(signal_target(0), None);
        assert_eq!(signal_target(u32::MAX), None);
        assert_eq!(signal_target(i32::MAX as u32 + 1), None);
        assert_eq!(signal_target(42), Some(Pid::from_raw(42)));
    }
}
