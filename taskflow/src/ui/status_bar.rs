//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme::{self, Palette};
use crate::app::{App, Focus, Modal};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let help_text = match (&app.modal, app.focus) {
        (Some(Modal::Task(_)), _) => "Tab: next field | Enter: save | Space: cycle | Esc: cancel",
        (Some(Modal::Board(_)), _) => "Tab: next field | Enter: save | Esc: cancel",
        (Some(Modal::Search), _) => "Type to search | Enter: keep | Esc: clear",
        (None, _) if app.drag.is_dragging() => "h/l: choose column | Space: drop | Esc: cancel",
        (None, Focus::Sidebar) => "j/k: move | Enter: open | b: new | D: delete | Tab: columns | q: quit",
        (None, Focus::Columns) => {
            "Space: drag | n/e/x: new/edit/delete | /: search | p/s/o: filter | r: reload | q: quit"
        }
    };

    let filter = app.store.filter();
    let mut filter_text = format!(
        "{} | {} {}",
        filter.priority.label(),
        filter.sort_key.label(),
        filter.direction.label()
    );
    if !filter.search.is_empty() {
        filter_text.push_str(&format!(" | \"{}\"", filter.search));
    }

    let mut spans = vec![
        Span::styled("TaskFlow", palette.status_bar().add_modifier(Modifier::BOLD)),
        Span::styled(" | ", palette.status_bar()),
        Span::styled(filter_text, palette.status_bar()),
        Span::styled(" | ", palette.status_bar()),
    ];
    if let Some(latest) = app.notifications().latest() {
        spans.push(Span::styled(
            latest.message,
            palette.status_bar().fg(theme::level_color(latest.level)),
        ));
        spans.push(Span::styled(" | ", palette.status_bar()));
    }
    spans.push(Span::styled(help_text, palette.status_bar().fg(palette.fg_dim)));

    let paragraph = Paragraph::new(Line::from(spans)).style(palette.status_bar());
    frame.render_widget(paragraph, area);
}
