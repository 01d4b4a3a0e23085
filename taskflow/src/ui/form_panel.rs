//! Modal form rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::theme::Palette;
use crate::app::{App, Modal};
use crate::tasks::{BoardField, BoardForm, FormMode, TaskField, TaskForm};

/// Render the open modal, if any, centred over `area`.
pub fn render(frame: &mut Frame, area: Rect, app: &App, palette: Palette) {
    match &app.modal {
        Some(Modal::Task(form)) => render_task_form(frame, centered(area, 60, 14), form, palette),
        Some(Modal::Board(form)) => render_board_form(frame, centered(area, 50, 6), form, palette),
        Some(Modal::Search) => {
            let rect = centered(area, 40, 3);
            let text = format!("{}█", app.store.filter().search);
            render_box(frame, rect, "Search", vec![Line::from(text)], palette);
        }
        None => {}
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_box(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'_>>, palette: Palette) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(palette.highlighted());
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(block).style(palette.normal()),
        area,
    );
}

fn field_line<'a>(label: &'a str, value: String, focused: bool, palette: Palette) -> Line<'a> {
    let (label_style, value) = if focused {
        (palette.highlighted(), format!("{value}█"))
    } else {
        (palette.dimmed(), value)
    };
    Line::from(vec![
        Span::styled(format!("{label:>12}: "), label_style),
        Span::styled(value, palette.normal()),
    ])
}

fn render_task_form(frame: &mut Frame, area: Rect, form: &TaskForm, palette: Palette) {
    let title = match form.mode {
        FormMode::Create => "New task",
        FormMode::Edit(_) => "Edit task",
    };
    let mut tags = form.tags.join(", ");
    if !form.tag_input.is_empty() || form.focus == TaskField::Tags {
        if !tags.is_empty() {
            tags.push_str(", ");
        }
        tags.push_str(&form.tag_input);
    }
    let fields = [
        (TaskField::Title, form.title.clone()),
        (TaskField::Description, form.description.clone()),
        (TaskField::Status, form.status.label().to_string()),
        (TaskField::Priority, form.priority.label().to_string()),
        (TaskField::DueDate, form.due_date.clone()),
        (TaskField::Tags, tags),
    ];
    let mut lines: Vec<Line> = fields
        .into_iter()
        .map(|(field, value)| field_line(field.label(), value, form.focus == field, palette))
        .collect();
    lines.push(Line::default());
    if form.is_submitting() {
        lines.push(Line::from(Span::styled("Saving...", palette.dimmed())));
    } else {
        lines.push(Line::from(Span::styled(
            "Due date as YYYY-MM-DD. Space cycles status and priority.",
            palette.dimmed(),
        )));
    }
    render_box(frame, area, title, lines, palette);
}

fn render_board_form(frame: &mut Frame, area: Rect, form: &BoardForm, palette: Palette) {
    let title = if form.editing.is_some() {
        "Rename board"
    } else {
        "New board"
    };
    let mut lines = vec![
        field_line("Name", form.name.clone(), form.focus == BoardField::Name, palette),
        field_line(
            "Description",
            form.description.clone(),
            form.focus == BoardField::Description,
            palette,
        ),
    ];
    if form.is_submitting() {
        lines.push(Line::from(Span::styled("Saving...", palette.dimmed())));
    }
    render_box(frame, area, title, lines, palette);
}
