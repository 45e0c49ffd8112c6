//! Subcommand implementations.

pub mod config;
pub mod list;
pub mod probe;
pub mod review;
pub mod terminate;

use std::path::Path;

use anyhow::{Context, Result};
use killonstart_core::{
    Config, ConfigStore, EventStatus, EventView, KillEvent, KillEventInput, Session,
    SignalTerminator, TerminationCoordinator,
};

/// Load the effective configuration.
pub async fn load_config() -> Result<Config> {
    let store = ConfigStore::new()?;
    Ok(store.load().await?)
}

/// Read a session file, applying the configured default grace period.
pub async fn load_events(path: &Path, default_grace_secs: u64) -> Result<Vec<KillEvent>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let inputs: Vec<KillEventInput> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid session file {}", path.display()))?;

    Ok(inputs
        .into_iter()
        .map(|input| input.into_event(default_grace_secs))
        .collect())
}

/// Load config and events, and start a session against the host terminator.
pub async fn open_session(path: &Path) -> Result<(Config, Session<SignalTerminator>)> {
    let config = load_config().await?;
    let events = load_events(path, config.default_grace_period_secs).await?;
    let coordinator = TerminationCoordinator::from_config(SignalTerminator::new(), &config);
    let session = coordinator.start_session(events)?;
    Ok((config, session))
}

/// Short status word for table output.
pub fn status_label(view: &EventView) -> &'static str {
    match view.status {
        EventStatus::Pending if view.grace_period_secs == 0 => "Locked",
        status => status.display_name(),
    }
}

/// Shorten `s` to `max` characters, eliding the middle.
pub fn truncate_middle(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max || max < 3 {
        return s.to_string();
    }
    let keep = max - 1;
    let head = keep / 2;
    let tail = keep - head;
    let start: String = s.chars().take(head).collect();
    let end: String = s.chars().skip(count - tail).collect();
    format!("{}…{}", start, end)
}
