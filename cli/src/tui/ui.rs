//! TUI rendering.

use killonstart_core::{EventStatus, EventView};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

use crate::commands::truncate_middle;

use super::app::App;

/// Below this column width a full path is not worth showing.
const NARROW_PATH: usize = 32;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Banner
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    draw_banner(f, app, chunks[0]);
    draw_table(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);
}

fn draw_banner(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from(app.message.as_str())];
    if let Some(url) = &app.url {
        lines.push(Line::from(vec![
            Span::styled("More info: ", Style::default().fg(Color::DarkGray)),
            Span::styled(url.as_str(), Style::default().fg(Color::Cyan).underlined()),
        ]));
    }

    let title = format!(
        " Kill on Startup | opened {} ",
        app.opened_at.format("%H:%M:%S")
    );
    let banner = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title),
    );

    f.render_widget(banner, area);
}

fn draw_table(f: &mut Frame, app: &App, area: Rect) {
    let header_cells = ["PROCESS", "PID", "GRACE", "", ""]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).bold()));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let path_width = area.width.saturating_sub(36).max(12) as usize;
    let rows = app.views.iter().enumerate().map(|(i, view)| {
        // Narrow terminals get the executable name instead of a mangled path.
        let path = if view.process_path.chars().count() > path_width && path_width < NARROW_PATH {
            truncate_middle(view.process_name(), path_width)
        } else {
            truncate_middle(&view.process_path, path_width)
        };
        let cells = vec![
            Cell::from(path),
            Cell::from(view.pid.to_string()),
            Cell::from(format!("Grace Period: {}", view.grace_period_secs))
                .style(Style::default().fg(Color::DarkGray)),
            button(view),
            completion_mark(view),
        ];

        let style = if i == app.selected {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        } else {
            Style::default()
        };

        Row::new(cells).style(style)
    });

    let widths = [
        Constraint::Min(12),
        Constraint::Length(8),
        Constraint::Length(18),
        Constraint::Length(10),
        Constraint::Length(2),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} processes ", app.views.len())),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let mut state = TableState::default();
    if !app.views.is_empty() {
        state.select(Some(app.selected));
    }

    f.render_stateful_widget(table, area, &mut state);
}

/// "Close" until a terminal state is confirmed; greyed out when disabled.
fn button(view: &EventView) -> Cell<'static> {
    let (label, color) = match view.status {
        EventStatus::ConfirmedSuccess => ("[Closed]", Color::Gray),
        EventStatus::ConfirmedFailure => ("[Close]", Color::Gray),
        EventStatus::Pending if view.is_closable() => ("[Close]", Color::Red),
        EventStatus::Pending => ("[Close]", Color::DarkGray),
    };
    let mut style = Style::default().fg(color);
    if !view.is_closable() {
        style = style.add_modifier(Modifier::DIM);
    }
    Cell::from(label).style(style)
}

/// Check or cross shown briefly after an attempt completes.
fn completion_mark(view: &EventView) -> Cell<'static> {
    if !view.just_completed {
        return Cell::from(" ");
    }
    match view.status {
        EventStatus::ConfirmedSuccess => Cell::from("✓").style(Style::default().fg(Color::Blue)),
        _ => Cell::from("✗").style(Style::default().fg(Color::Red)),
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let status = app.get_status().unwrap_or("");
    let help = "j/k: navigate | Enter: close process | Esc/q: dismiss";

    let footer_text = if status.is_empty() {
        help.to_string()
    } else {
        format!("{} | {}", status, help)
    };

    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    f.render_widget(footer, area);
}
