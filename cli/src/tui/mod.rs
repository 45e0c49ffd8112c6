//! Interactive review window.

mod app;
mod ui;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;

use crate::commands::open_session;

use app::App;

/// How often the window re-reads the session while idle.
const TICK: Duration = Duration::from_millis(100);

pub async fn run(events: &Path) -> Result<()> {
    let (config, session) = open_session(events).await?;
    let mut app = App::new(session, &config);

    let mut terminal = ratatui::init();
    let result = blocking_input(|| run_loop(&mut terminal, &mut app));
    ratatui::restore();

    app.dismiss();
    result
}

/// Run a loop that blocks on terminal input. Termination tasks keep running on
/// the other runtime workers meanwhile, so this needs the multi-thread runtime.
fn blocking_input<R>(f: impl FnOnce() -> R) -> R {
    tokio::task::block_in_place(f)
}

fn run_loop(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    loop {
        app.refresh();
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Char('j') | KeyCode::Down => app.next(),
            KeyCode::Char('k') | KeyCode::Up => app.previous(),
            KeyCode::Char('c') | KeyCode::Char('x') | KeyCode::Enter => app.close_selected(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use killonstart_core::{EventStatus, KillEvent, SignalTerminator, TerminationCoordinator};

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_terminations_progress_while_input_blocks() {
        let session = TerminationCoordinator::new(SignalTerminator::new())
            .start_session(vec![KillEvent::new("/nonexistent", 0, 0, 10)])
            .unwrap();
        drop(session.spawn_termination(0, 0));

        // Poll the way the review window does, without yielding to tokio.
        let status = blocking_input(|| {
            for _ in 0..200 {
                let status = session.view(0, 0).unwrap().status;
                if status != EventStatus::Pending {
                    return status;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            EventStatus::Pending
        });

        assert_eq!(status, EventStatus::ConfirmedFailure);
    }
}
