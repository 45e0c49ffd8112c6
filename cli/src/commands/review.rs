//! Review command - line-prompt fallback for the review window.

use std::path::Path;

use anyhow::Result;
use killonstart_core::{Error, EventView};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{open_session, status_label, truncate_middle};

pub async fn run(events: &Path) -> Result<()> {
    let (config, session) = open_session(events).await?;

    println!("{}", config.message());
    if let Some(url) = &config.custom_url {
        println!("More info: {}", url);
    }
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let views = session.snapshot();
        print_table(&views);

        if !views.iter().any(EventView::is_closable) {
            println!("Nothing left to close.");
            break;
        }

        println!("Enter a row number to close it, or q to dismiss:");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            break;
        }

        let Some(view) = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| views.get(i))
        else {
            println!("No row {}", line);
            continue;
        };

        let handle = session.spawn_termination(view.pid, view.generation);
        match handle.await? {
            Ok(_) => {}
            Err(Error::GracePeriodExpiredOrDisabled { .. }) => {
                println!("Closing is disabled for {}", view.process_path);
            }
            Err(e) if e.is_validation() => println!("Not available: {}", e),
            Err(e) => return Err(e.into()),
        }
    }

    session.dismiss();
    Ok(())
}

fn print_table(views: &[EventView]) {
    for (i, view) in views.iter().enumerate() {
        let mark = match (view.just_completed, view.status) {
            (true, killonstart_core::EventStatus::ConfirmedSuccess) => "✓",
            (true, _) => "✗",
            _ => " ",
        };
        println!(
            "{:>3}. {} {:<8} {:<48} Grace Period: {}",
            i + 1,
            mark,
            status_label(view),
            truncate_middle(&view.process_path, 48),
            view.grace_period_secs
        );
    }
}
