//! Fixed styles for the dashboard widgets.
//!
//! Theming systems are a non-goal; these helpers exist so every component
//! styles the same states the same way.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders};

use crate::app::StatusLevel;

/// Green used for selected cells, matching the original dashboards.
const SELECTED: Color = Color::Green;

pub fn block(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(focused))
        .title(Span::styled(title, title_style(focused)))
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

pub fn title_style(focused: bool) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    if focused {
        style.fg(Color::Cyan)
    } else {
        style.fg(Color::Gray)
    }
}

pub fn header_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn muted_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// A cell whose value is the active selection for its parameter.
pub fn selected_cell_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(SELECTED)
        .add_modifier(Modifier::BOLD)
}

/// The cell under the keyboard cursor.
pub fn cursor_cell_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

/// A selected cell that is also under the cursor.
pub fn selected_cursor_cell_style() -> Style {
    selected_cell_style().add_modifier(Modifier::UNDERLINED)
}

pub fn status_style(level: StatusLevel) -> Style {
    let color = match level {
        StatusLevel::Info => Color::Cyan,
        StatusLevel::Warn => Color::Yellow,
        StatusLevel::Error => Color::Red,
        StatusLevel::Success => Color::Green,
    };
    Style::default().fg(color)
}

pub fn hint_key_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

pub fn hint_text_style() -> Style {
    muted_style()
}
