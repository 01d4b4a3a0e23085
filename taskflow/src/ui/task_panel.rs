//! Status column rendering.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use taskflow_proto::{Task, TaskStatus};

use super::theme::{self, ERROR, Palette};
use crate::app::{App, Focus};
use crate::store::LoadState;

/// Render the three status columns of the selected board.
pub fn render(frame: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let Some(board) = app.store.selected_board() else {
        let block = Block::default().borders(Borders::ALL).title("Tasks");
        let hint = Paragraph::new(Span::styled(
            "No board selected. Press b to create one.",
            palette.dimmed(),
        ))
        .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let state = app
        .store
        .tasks(board.id)
        .map_or(LoadState::Idle, |c| c.state.clone());
    if let LoadState::Error(message) = &state {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(board.name.as_str());
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

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let columns = app.store.visible_columns();
    let loading = state == LoadState::Loading;
    for (status, (tasks, chunk)) in TaskStatus::ALL
        .into_iter()
        .zip(columns.iter().zip(chunks.iter()))
    {
        render_column(frame, *chunk, app, palette, status, tasks, loading);
    }
}

fn render_column(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    palette: Palette,
    status: TaskStatus,
    tasks: &[&Task],
    loading: bool,
) {
    let is_focused = app.focus == Focus::Columns && app.column == status;
    let border = if app.drag.highlighted_column() == Some(status) {
        palette.drop_target()
    } else if is_focused {
        palette.highlighted()
    } else {
        palette.normal()
    };
    let title = Line::from(vec![
        Span::styled(
            status.label(),
            palette.bold().fg(theme::status_color(status)),
        ),
        Span::styled(format!(" ({})", tasks.len()), palette.dimmed()),
    ]);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border);

    if loading && tasks.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("Loading...", palette.dimmed())).block(block),
            area,
        );
        return;
    }

    let dragged = app.drag.dragged_task();
    let items: Vec<ListItem> = tasks
        .iter()
        .enumerate()
        .map(|(idx, task)| {
            let mut header = vec![
                Span::styled(
                    format!("[{}] ", task.priority.label()),
                    palette.normal().fg(theme::priority_color(task.priority)),
                ),
                Span::raw(task.title.as_str()),
            ];
            if dragged == Some(task.id) {
                header.push(Span::styled(" ⇄", palette.drop_target()));
            }
            let mut lines = vec![Line::from(header)];

            let mut meta = Vec::new();
            if let Some(due) = task.due_date {
                meta.push(Span::styled(
                    format!("due {}", due.format(app.date_format())),
                    palette.dimmed(),
                ));
            }
            if !task.tags.is_empty() {
                if !meta.is_empty() {
                    meta.push(Span::raw(" "));
                }
                let tags: Vec<String> = task.tags.iter().map(|t| format!("#{t}")).collect();
                meta.push(Span::styled(tags.join(" "), palette.dimmed()));
            }
            if !meta.is_empty() {
                lines.push(Line::from(meta));
            }

            let style = if is_focused && idx == app.row {
                palette.selected()
            } else {
                palette.normal()
            };
            ListItem::new(lines).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
