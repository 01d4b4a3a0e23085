//! Sidebar rendering for the board list.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use super::theme::{ERROR, Palette};
use crate::app::{App, Focus};
use crate::store::LoadState;

/// Render the sidebar with the board list.
pub fn render(frame: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let is_focused = app.focus == Focus::Sidebar;
    let block = Block::default()
        .title("Boards")
        .borders(Borders::ALL)
        .border_style(if is_focused {
            palette.highlighted()
        } else {
            palette.normal()
        });

    let boards = app.store.boards();

    // An error takes precedence over stale data.
    if let LoadState::Error(message) = &boards.state {
        let text = vec![
            Line::from(Span::styled(message.as_str(), palette.normal().fg(ERROR))),
            Line::from(Span::styled("Press r to reload", palette.dimmed())),
        ];
        frame.render_widget(
            Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
            area,
        );
        return;
    }
    if boards.state == LoadState::Loading && boards.items.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("Loading boards...", palette.dimmed())).block(block),
            area,
        );
        return;
    }

    let selected = app.store.selected_board_id();
    let items: Vec<ListItem> = boards
        .items
        .iter()
        .enumerate()
        .map(|(idx, board)| {
            let marker = if Some(board.id) == selected { "● " } else { "  " };
            let style = if is_focused && idx == app.sidebar_cursor {
                palette.selected()
            } else if Some(board.id) == selected {
                palette.highlighted()
            } else {
                palette.normal()
            };
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::raw(board.name.as_str()),
            ]))
            .style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
