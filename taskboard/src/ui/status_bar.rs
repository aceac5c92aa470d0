//! Notice line and status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::App;
use crate::notice::Notice;

/// Render the line above the status bar: a pending confirmation, else
/// the latest notice.
pub fn render_notice(frame: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(confirm) = &app.confirm {
        Line::from(vec![
            Span::styled(confirm.prompt, theme::normal().fg(theme::WARNING)),
            Span::styled(" (y/n)", theme::bold()),
        ])
    } else {
        match app.notices.back() {
            Some(Notice::Success(text)) => {
                Line::from(Span::styled(text.as_str(), theme::normal().fg(theme::SUCCESS)))
            }
            Some(Notice::Error(text)) => {
                Line::from(Span::styled(text.as_str(), theme::normal().fg(theme::ERROR)))
            }
            None => Line::default(),
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = if app.grabbed.is_some() {
        "←→/hl ↑↓/jk: pick target | Enter: drop | Esc: cancel"
    } else {
        "←→/hl ↑↓/jk: navigate | Space: grab | r: refresh | d/D: delete card/board | q: quit"
    };

    let mut spans = vec![
        Span::styled("Taskboard", theme::bold()),
        Span::raw(" | "),
        Span::raw(app.project_name.clone()),
    ];
    if !app.pending.is_empty() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("saving {}", app.pending.len()),
            theme::normal().fg(theme::WARNING),
        ));
    }
    spans.push(Span::raw(" | "));
    spans.push(Span::styled(help_text, theme::dimmed()));

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
