//! macOS terminator implementation using ps and signals.
//!
//! The generation token of a process is its start time in whole seconds since
//! the Unix epoch, as reported by `ps -o lstart=`. `ps` runs with `TZ=UTC` and
//! the C locale so the timestamp parses the same on every host.

use std::process::Stdio;

use chrono::NaiveDateTime;
use tokio::process::Command;
use tracing::debug;

use crate::domain::TerminationOutcome;
use crate::error::{Error, Result};

use super::signal::{send_sigkill, signal_target};
use super::Terminator;

/// `lstart` layout once runs of spaces are collapsed, e.g. `Mon Oct 5 09:03:11 2026`.
const LSTART_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// macOS-specific terminator.
pub struct DarwinTerminator;

impl DarwinTerminator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DarwinTerminator {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one `lstart` value (in UTC) into epoch seconds.
fn parse_lstart(lstart: &str) -> Option<u64> {
    let normalized = lstart.split_whitespace().collect::<Vec<_>>().join(" ");
    let started = NaiveDateTime::parse_from_str(&normalized, LSTART_FORMAT).ok()?;
    u64::try_from(started.and_utc().timestamp()).ok()
}

impl Terminator for DarwinTerminator {
    async fn generation_of(&self, pid: u32) -> Result<Option<u64>> {
        if pid == 0 {
            return Ok(None);
        }

        let output = Command::new("/bin/ps")
            .args(["-o", "lstart=", "-p"])
            .arg(pid.to_string())
            .env("TZ", "UTC")
            .env("LC_ALL", "C")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await?;

        // ps exits 1 with no output when the PID does not exist.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let lstart = stdout.trim();
        if lstart.is_empty() {
            return Ok(None);
        }

        parse_lstart(lstart).map(Some).ok_or_else(|| {
            Error::ParseError(format!("Unexpected start time for process {}: {}", pid, lstart))
        })
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
