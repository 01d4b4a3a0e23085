//! Terminal UI rendering.

pub mod form_panel;
pub mod sidebar;
pub mod status_bar;
pub mod task_panel;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    widgets::Block,
};

use crate::app::App;
use theme::Palette;

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    let palette = Palette::for_mode(app.dark_mode);
    frame.render_widget(Block::default().style(palette.normal()), frame.area());

    // Content above a one-line status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(20), Constraint::Percentage(80)])
        .split(main_chunks[0]);

    sidebar::render(frame, content_chunks[0], app, palette);
    task_panel::render(frame, content_chunks[1], app, palette);
    status_bar::render(frame, main_chunks[1], app, palette);
    form_panel::render(frame, frame.area(), app, palette);
}
