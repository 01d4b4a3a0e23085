//! Theme and styling for the TUI.
//!
//! Two palettes, selected by [`Palette::for_mode`]. Priority and status
//! colours are shared between them.

use ratatui::style::{Color, Modifier, Style};
use taskflow_proto::{Priority, TaskStatus};

use crate::notify::Level;

/// Colours for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Primary foreground.
    pub fg: Color,
    /// Secondary (dimmed) foreground.
    pub fg_dim: Color,
    /// Background.
    pub bg: Color,
    /// Focused borders and highlights.
    pub accent: Color,
    /// Status bar background.
    pub bar_bg: Color,
}

/// Dark palette.
pub const DARK: Palette = Palette {
    fg: Color::White,
    fg_dim: Color::Gray,
    bg: Color::Black,
    accent: Color::Cyan,
    bar_bg: Color::Rgb(30, 30, 50),
};

/// Light palette.
pub const LIGHT: Palette = Palette {
    fg: Color::Black,
    fg_dim: Color::DarkGray,
    bg: Color::White,
    accent: Color::Blue,
    bar_bg: Color::Rgb(220, 220, 235),
};

/// Success colour.
pub const SUCCESS: Color = Color::Green;

/// Warning colour.
pub const WARNING: Color = Color::Yellow;

/// Error colour.
pub const ERROR: Color = Color::Red;

impl Palette {
    /// Palette for the given mode.
    #[must_use]
    pub const fn for_mode(dark: bool) -> Self {
        if dark { DARK } else { LIGHT }
    }

    /// Normal text.
    #[must_use]
    pub fn normal(self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Dimmed text (metadata, help).
    #[must_use]
    pub fn dimmed(self) -> Style {
        Style::default().fg(self.fg_dim).bg(self.bg)
    }

    /// Bold text.
    #[must_use]
    pub fn bold(self) -> Style {
        self.normal().add_modifier(Modifier::BOLD)
    }

    /// Focused panel border.
    #[must_use]
    pub fn highlighted(self) -> Style {
        Style::default()
            .fg(self.accent)
            .bg(self.bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Selected list item.
    #[must_use]
    pub fn selected(self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Drop-target column border.
    #[must_use]
    pub fn drop_target(self) -> Style {
        Style::default()
            .fg(WARNING)
            .bg(self.bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Status bar.
    #[must_use]
    pub fn status_bar(self) -> Style {
        Style::default().fg(self.fg).bg(self.bar_bg)
    }
}

/// Colour of a priority badge.
#[must_use]
pub const fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Gray,
        Priority::Medium => Color::Blue,
        Priority::High => Color::Yellow,
        Priority::Urgent => Color::Red,
    }
}

/// Colour of a column title.
#[must_use]
pub const fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Cyan,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Done => Color::Green,
    }
}

/// Colour of a notification.
#[must_use]
pub const fn level_color(level: Level) -> Color {
    match level {
        Level::Success => SUCCESS,
        Level::Info => Color::Cyan,
        Level::Error => ERROR,
    }
}
