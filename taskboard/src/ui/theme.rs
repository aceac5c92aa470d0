//! Theme and styling constants for the TUI.

use ratatui::style::{Color, Modifier, Style};

use taskboard_proto::task::{Priority, TaskStatus};

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Highlight color for focused elements.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Success color.
pub const SUCCESS: Color = Color::Green;

/// Warning color.
pub const WARNING: Color = Color::Yellow;

/// Error color.
pub const ERROR: Color = Color::Red;

/// Column title color.
pub const COLUMN_TITLE: Color = Color::Blue;

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (metadata).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Highlighted text style (focused column borders).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Selected item style (focused card).
#[must_use]
pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Style for a grabbed card.
#[must_use]
pub fn grabbed() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(WARNING)
        .add_modifier(Modifier::BOLD)
}

/// Style for a card whose move is in flight.
#[must_use]
pub fn pending() -> Style {
    Style::default()
        .fg(FG_SECONDARY)
        .add_modifier(Modifier::ITALIC)
}

/// Color of the status dot on a card.
#[must_use]
pub const fn status_color(status: &TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Gray,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Completed => Color::Green,
        TaskStatus::Other(_) => Color::DarkGray,
    }
}

/// Color of the priority marker on a card.
#[must_use]
pub const fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Blue,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Red,
    }
}

/// Style for the status bar background (dark background with white foreground).
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 50))
}

/// Style for panel titles with a given color (bold).
#[must_use]
pub fn panel_title(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}
