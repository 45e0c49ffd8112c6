//! Terminate command - close one event in a one-shot session.

use std::path::Path;

use anyhow::{bail, Result};
use killonstart_core::{Error, TerminationState};

use super::open_session;

pub async fn run(events: &Path, pid: u32, generation: u64, json: bool) -> Result<()> {
    let (_config, session) = open_session(events).await?;

    let state = match session.request_termination(pid, generation).await {
        Ok(state) => state,
        Err(Error::GracePeriodExpiredOrDisabled { .. }) => {
            bail!("Process {} cannot be closed: its grace period is disabled", pid)
        }
        Err(Error::UnknownEvent { .. }) => {
            bail!("No event for process {} with generation {}", pid, generation)
        }
        Err(e) => return Err(e.into()),
    };
    let view = session.view(pid, generation);
    session.dismiss();

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let reason = view
        .and_then(|v| v.outcome)
        .map(|o| o.to_string())
        .unwrap_or_else(|| "attempt failed".to_string());
    match state {
        TerminationState::Confirmed { success: true } => {
            println!("✓ Closed process {} ({})", pid, reason)
        }
        _ => println!("✗ Could not close process {} ({})", pid, reason),
    }
    Ok(())
}
