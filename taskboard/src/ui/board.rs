//! Board columns and cards.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use taskboard_proto::task::Task;
use taskboard_proto::user::ref_initials;

use super::theme;
use crate::app::App;

/// Render one column per board.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    if app.boards.is_empty() {
        let empty = Paragraph::new("No boards yet")
            .style(theme::dimmed())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let count = u32::try_from(app.boards.len()).unwrap_or(u32::MAX);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(app.boards.iter().map(|_| Constraint::Ratio(1, count)))
        .split(area);

    for (index, (board, column)) in app.boards.iter().zip(columns.iter()).enumerate() {
        let focused = index == app.column;
        let cards = app.cards_in(index);

        let border_style = if focused && app.card.is_none() {
            theme::highlighted()
        } else if focused {
            theme::normal()
        } else {
            theme::dimmed()
        };
        let title = Line::from(vec![
            Span::styled(board.title.clone(), theme::panel_title(theme::COLUMN_TITLE)),
            Span::styled(format!(" ({})", cards.len()), theme::dimmed()),
        ]);
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let items: Vec<ListItem> = cards
            .iter()
            .enumerate()
            .map(|(position, task)| {
                let is_focused = focused && app.card == Some(position);
                card(app, task, is_focused)
            })
            .collect();

        frame.render_widget(List::new(items).block(block), *column);
    }
}

fn card<'a>(app: &App, task: &'a Task, focused: bool) -> ListItem<'a> {
    let grabbed = app.grabbed.as_ref() == Some(&task.id);
    let pending = app.is_pending(&task.id);

    let mut spans = vec![
        Span::styled("● ", theme::normal().fg(theme::status_color(&task.status))),
        Span::styled(
            "▌",
            theme::normal().fg(theme::priority_color(task.priority)),
        ),
        Span::raw(" "),
        Span::raw(task.title.as_str()),
    ];
    let initials: Vec<String> = task.assigned_to.iter().map(ref_initials).collect();
    if !initials.is_empty() {
        spans.push(Span::styled(format!("  [{}]", initials.join(" ")), theme::dimmed()));
    }
    if pending {
        spans.push(Span::styled(" …", theme::dimmed()));
    }

    let style = if grabbed {
        theme::grabbed()
    } else if focused {
        theme::selected()
    } else if pending {
        theme::pending()
    } else {
        theme::normal()
    };
    ListItem::new(Line::from(spans)).style(style)
}
