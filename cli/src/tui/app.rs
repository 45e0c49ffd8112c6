//! Review window state.

use chrono::{DateTime, Local};
use killonstart_core::{Config, EventView, Session, SignalTerminator};

pub struct App {
    session: Session<SignalTerminator>,
    pub views: Vec<EventView>,
    pub selected: usize,
    pub message: String,
    pub url: Option<String>,
    pub opened_at: DateTime<Local>,
    status: Option<String>,
}

impl App {
    pub fn new(session: Session<SignalTerminator>, config: &Config) -> Self {
        let views = session.snapshot();
        Self {
            session,
            views,
            selected: 0,
            message: config.message().to_string(),
            url: config.custom_url.clone(),
            opened_at: Local::now(),
            status: None,
        }
    }

    /// Pull the latest projection from the session.
    pub fn refresh(&mut self) {
        self.views = self.session.snapshot();
        if self.selected >= self.views.len() {
            self.selected = self.views.len().saturating_sub(1);
        }
    }

    pub fn next(&mut self) {
        if !self.views.is_empty() {
            self.selected = (self.selected + 1) % self.views.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.views.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.views.len() - 1);
        }
    }

    /// Ask the session to close the selected event in the background.
    ///
    /// A disabled row is a no-op with a status hint, not an error.
    pub fn close_selected(&mut self) {
        let Some(view) = self.views.get(self.selected) else {
            return;
        };
        if !view.is_closable() {
            self.status = Some(if view.grace_period_secs == 0 {
                "Closing is disabled for this process".to_string()
            } else {
                "Already handled".to_string()
            });
            return;
        }

        // The session records the outcome; the handle is not needed.
        drop(self.session.spawn_termination(view.pid, view.generation));
        self.status = Some(format!("Closing {}", view.process_path));
    }

    pub fn dismiss(&self) {
        self.session.dismiss();
    }

    pub fn get_status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}
