//! List command - show the events of a session file.

use std::path::Path;

use anyhow::Result;

use super::{open_session, status_label, truncate_middle};

pub async fn run(events: &Path, json: bool) -> Result<()> {
    let (_config, session) = open_session(events).await?;
    let views = session.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("No kill-on-startup events.");
        return Ok(());
    }

    println!(
        "{:<8} {:<14} {:<7} {:<8} PATH",
        "PID", "GENERATION", "GRACE", "STATUS"
    );
    println!("{}", "-".repeat(80));

    for view in &views {
        println!(
            "{:<8} {:<14} {:<7} {:<8} {}",
            view.pid,
            view.generation,
            view.grace_period_secs,
            status_label(view),
            truncate_middle(&view.process_path, 40)
        );
    }

    println!("\nTotal: {} events", views.len());
    Ok(())
}
