//! Linux terminator implementation using procfs and signals.
//!
//! The generation token of a process is its start time in clock ticks since
//! boot (field 22 of `/proc/<pid>/stat`). A reused PID always has a later
//! start time, so comparing it before signalling keeps the kill on the
//! instance the event was recorded for.

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::domain::TerminationOutcome;
use crate::error::{Error, Result};

use super::signal::{send_sigkill, signal_target};
use super::Terminator;

/// Index of `starttime` among the fields that follow the `(comm)` field.
const STARTTIME_FIELD: usize = 19;

/// Linux-specific terminator.
pub struct LinuxTerminator {
    proc_root: PathBuf,
}

impl LinuxTerminator {
    pub fn new() -> Self {
        Self::with_proc_root(PathBuf::from("/proc"))
    }

    /// Use a custom procfs mount (for testing).
    pub fn with_proc_root(proc_root: PathBuf) -> Self {
        Self { proc_root }
    }

    fn stat_path(&self, pid: u32) -> PathBuf {
        self.proc_root.join(pid.to_string()).join("stat")
    }
}

impl Default for LinuxTerminator {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the start time from the contents of `/proc/<pid>/stat`.
///
/// `comm` may itself contain spaces and parentheses, so fields are counted
/// from the last closing parenthesis.
fn parse_start_time(stat: &str) -> Option<u64> {
    let rest = &stat[stat.rfind(')')? + 1..];
    rest.split_whitespace().nth(STARTTIME_FIELD)?.parse().ok()
}

impl Terminator for LinuxTerminator {
    async fn generation_of(&self, pid: u32) -> Result<Option<u64>> {
        if pid == 0 {
            return Ok(None);
        }

        let content = match tokio::fs::read_to_string(self.stat_path(pid)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };

        parse_start_time(&content)
            .map(Some)
            .ok_or_else(|| Error::ParseError(format!("Malformed stat for process {}", pid)))
    }

    async fn terminate(&self, pid: u32, generation: u64) -> Result<TerminationOutcome> {
        let Some(target) = signal_target(pid) else {
            return Ok(TerminationOutcome::NotFound);
        };

        match self.generation_of(pid).await? {
            Some(current) if current == generation => {}
            Some(current) => {
                debug!(pid, generation, current, "PID reused by a newer process");
                return Ok(TerminationOutcome::NotFound);
            }
            None => {
                debug!(pid, "Process not found");
                return Ok(TerminationOutcome::NotFound);
            }
        }

        send_sigkill(target, generation)
    }
}
