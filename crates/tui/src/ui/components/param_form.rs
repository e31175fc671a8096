//! Parameter edit form pane with the Launch action.
//!
//! One control per visible parameter: a checkbox for bools, a stepped
//! numeric input for ints, a numeric input for floats, free text for
//! strings. Controls are seeded by the selection state and type defaults;
//! whatever they hold is exactly what a launch publishes. The Launch button
//! is the last focusable entry.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use relaunch_types::{FormMode, ParamValue, ValueKind};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Effect, Focus};
use crate::theme;
use crate::ui::components::component::Component;

pub(crate) struct ParamFormPane {
    /// Cursor over visible controls; one past the last is the Launch button.
    cursor: usize,
    inner: Rect,
}

impl ParamFormPane {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            inner: Rect::default(),
        }
    }

    pub fn area(&self) -> Rect {
        self.inner
    }

    fn visible(&self, app: &App) -> Vec<usize> {
        app.session.form().visible_indices(app.session.selection())
    }

    fn on_launch_button(&self, app: &App) -> bool {
        self.cursor >= self.visible(app).len()
    }

    /// Field index (into the full form) under the cursor, if any.
    fn field_under_cursor(&self, app: &App) -> Option<usize> {
        self.visible(app).get(self.cursor).copied()
    }

    fn edit_field(&self, app: &mut App, key: &KeyEvent) {
        let Some(index) = self.field_under_cursor(app) else {
            return;
        };
        let Some(field) = app.session.form_mut().field_at_mut(index) else {
            return;
        };
        match (field.kind(), key.code) {
            (ValueKind::Bool, KeyCode::Char(' ')) | (ValueKind::Bool, KeyCode::Enter) => {
                field.toggle()
            }
            (ValueKind::Int, KeyCode::Char('+')) | (ValueKind::Int, KeyCode::Right) => {
                field.step(1)
            }
            (ValueKind::Int, KeyCode::Char('-')) if field.buffer().is_empty() => field.step(-1),
            (ValueKind::Int, KeyCode::Left) => field.step(-1),
            (_, KeyCode::Char(c)) => field.insert_char(c),
            (_, KeyCode::Backspace) => field.backspace(),
            (_, KeyCode::Delete) => field.reset(),
            _ => return,
        }
        app.dirty = true;
    }

    fn control_spans<'a>(field: &'a relaunch_session::ParamField, active: bool) -> Vec<Span<'a>> {
        let value_style = if !field.buffer_valid() {
            Style::default().fg(Color::Red)
        } else if active {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        match field.kind() {
            ValueKind::Bool => {
                let mark = if matches!(field.value(), ParamValue::Bool(true)) {
                    "[x]"
                } else {
                    "[ ]"
                };
                vec![Span::styled(mark, value_style)]
            }
            _ => {
                let mut spans = vec![Span::styled(field.buffer(), value_style)];
                if active {
                    spans.push(Span::styled("▏", theme::muted_style()));
                }
                spans
            }
        }
    }
}

impl Component for ParamFormPane {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let entries = self.visible(app).len() + 1;
        match key.code {
            KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                app.dirty = true;
                Vec::new()
            }
            KeyCode::Down => {
                if self.cursor + 1 < entries {
                    self.cursor += 1;
                    app.dirty = true;
                }
                Vec::new()
            }
            KeyCode::Enter | KeyCode::Char(' ') if self.on_launch_button(app) => {
                app.request_launch()
            }
            _ => {
                self.edit_field(app, &key);
                Vec::new()
            }
        }
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Vec::new();
        }
        let row = (mouse.row.saturating_sub(self.inner.y)) as usize;
        let visible = self.visible(app);
        // Fields, a spacer line, then the Launch button; with no fields a
        // hint line takes the first row.
        let launch_row = visible.len().max(1) + 1;
        if row < visible.len() {
            self.cursor = row;
            app.dirty = true;
            // A click toggles checkboxes directly.
            if let Some(field) = app.session.form_mut().field_at_mut(visible[row]) {
                if field.kind() == ValueKind::Bool {
                    field.toggle();
                }
            }
            Vec::new()
        } else if row == launch_row {
            self.cursor = visible.len();
            app.request_launch()
        } else {
            Vec::new()
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let focused = app.focus == Focus::Form;
        let block = theme::block("Experiment Parameters", focused);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        self.inner = inner;

        let visible = self.visible(app);
        self.cursor = self.cursor.min(visible.len());

        let mut lines: Vec<Line> = Vec::new();
        if visible.is_empty() {
            let hint = match app.session.form().mode() {
                FormMode::SelectedOnly => "Select parameter values from the table.",
                FormMode::ShowAll => "No parameters known yet.",
            };
            lines.push(Line::from(Span::styled(hint, theme::muted_style())));
        } else {
            let name_width = visible
                .iter()
                .filter_map(|&i| app.session.form().field_at(i))
                .map(|f| f.name().width())
                .max()
                .unwrap_or(0);
            for (pos, &index) in visible.iter().enumerate() {
                let Some(field) = app.session.form().field_at(index) else {
                    continue;
                };
                let active = focused && pos == self.cursor;
                let selected = app.session.selection().get(field.name()).is_some();
                let marker = if selected { "●" } else { " " };
                let mut spans = vec![
                    Span::styled(marker, theme::selected_cell_style().bg(Color::Reset)),
                    Span::raw(" "),
                    Span::styled(
                        format!("{:<name_width$}", field.name()),
                        if active {
                            theme::header_style()
                        } else {
                            Style::default()
                        },
                    ),
                    Span::styled(format!(" ({}) ", field.kind()), theme::muted_style()),
                ];
                spans.extend(Self::control_spans(field, active));
                lines.push(Line::from(spans));
            }
        }

        lines.push(Line::default());
        let launch_active = focused && self.on_launch_button(app);
        let mut launch_style = Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD);
        if launch_active {
            launch_style = launch_style.add_modifier(Modifier::REVERSED);
        }
        let launch_label = if app.launching {
            "[ Launching… ]"
        } else {
            "[ Launch Experiment ]"
        };
        lines.push(Line::from(Span::styled(launch_label, launch_style)));

        frame.render_widget(Paragraph::new(lines), inner);
    }
}
