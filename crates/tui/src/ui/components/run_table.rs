//! Paginated run table with selectable parameter cells.
//!
//! One row per historical run, one column per known parameter. The cell
//! cursor moves with the arrow keys; Enter or Space (or a mouse click)
//! toggles the cell's value as the selection for its parameter. Cells whose
//! value is the active selection render highlighted, mirroring the original
//! dashboards' green buttons.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Effect, Focus};
use crate::theme;
use crate::ui::components::component::Component;

const MIN_COL: u16 = 5;
const MAX_COL: u16 = 18;
const MAX_LABEL: u16 = 30;

pub(crate) struct RunTable {
    /// Row under the cursor, relative to the current page.
    cursor_row: usize,
    /// Parameter column under the cursor.
    cursor_col: usize,
    // Geometry from the last render, for mouse hit testing.
    inner: Rect,
    label_width: u16,
    column_widths: Vec<u16>,
}

impl RunTable {
    pub fn new() -> Self {
        Self {
            cursor_row: 0,
            cursor_col: 0,
            inner: Rect::default(),
            label_width: 0,
            column_widths: Vec::new(),
        }
    }

    pub fn area(&self) -> Rect {
        self.inner
    }

    fn toggle_at_cursor(&self, app: &mut App) {
        let names = app.session.parameter_names();
        let Some(name) = names.get(self.cursor_col) else {
            return;
        };
        let row = app.session.page_rows().start + self.cursor_row;
        if app.session.toggle_cell(row, name) {
            app.dirty = true;
        }
    }

    fn page_len(&self, app: &App) -> usize {
        app.session.page_rows().len()
    }

    /// Map a terminal position to a (page row, parameter column) cell.
    fn hit_test(&self, app: &App, x: u16, y: u16) -> Option<(usize, usize)> {
        // Row 0 of the inner area is the header.
        let row = (y > self.inner.y).then(|| (y - self.inner.y - 1) as usize)?;
        if row >= self.page_len(app) {
            return None;
        }
        let mut start = self.inner.x + self.label_width + 1;
        for (col, width) in self.column_widths.iter().enumerate() {
            if x >= start && x < start + width {
                return Some((row, col));
            }
            start += width + 1;
        }
        None
    }
}

/// Pad or truncate `text` to exactly `width` display columns.
fn fit(text: &str, width: u16) -> String {
    let width = width as usize;
    let text_width = text.width();
    if text_width <= width {
        let mut out = text.to_string();
        out.push_str(&" ".repeat(width - text_width));
        return out;
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w >= width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out.push_str(&" ".repeat(width.saturating_sub(used + 1)));
    out
}

fn clamp_width(w: usize, min: u16, max: u16) -> u16 {
    (w as u16).clamp(min, max)
}

impl Component for RunTable {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let page_len = self.page_len(app);
        let columns = app.session.form().fields().len();
        match key.code {
            KeyCode::Up => {
                self.cursor_row = self.cursor_row.saturating_sub(1);
                app.dirty = true;
            }
            KeyCode::Down => {
                if self.cursor_row + 1 < page_len {
                    self.cursor_row += 1;
                    app.dirty = true;
                }
            }
            KeyCode::Left => {
                self.cursor_col = self.cursor_col.saturating_sub(1);
                app.dirty = true;
            }
            KeyCode::Right => {
                if self.cursor_col + 1 < columns {
                    self.cursor_col += 1;
                    app.dirty = true;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_at_cursor(app),
            KeyCode::PageDown | KeyCode::Char('n') => {
                app.session.page_next();
                self.cursor_row = 0;
                app.dirty = true;
            }
            KeyCode::PageUp | KeyCode::Char('p') => {
                app.session.page_prev();
                self.cursor_row = 0;
                app.dirty = true;
            }
            KeyCode::Home => {
                while app.session.pager().has_prev() {
                    app.session.page_prev();
                }
                self.cursor_row = 0;
                app.dirty = true;
            }
            KeyCode::Char('r') => return app.reload_runs(),
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
            if let Some((row, col)) = self.hit_test(app, mouse.column, mouse.row) {
                self.cursor_row = row;
                self.cursor_col = col;
                self.toggle_at_cursor(app);
            }
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let focused = app.focus == Focus::Table;
        let block = theme::block("Past Runs", focused);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        self.inner = inner;

        let runs = app.session.runs();
        if runs.is_empty() {
            let hint = if app.loading { "Loading…" } else { "No runs to show." };
            frame.render_widget(Paragraph::new(Span::styled(hint, theme::muted_style())), inner);
            return;
        }

        let names = app.session.parameter_names();
        let page = app.session.page_rows();
        let page_len = page.len();
        self.cursor_row = self.cursor_row.min(page_len.saturating_sub(1));
        self.cursor_col = self.cursor_col.min(names.len().saturating_sub(1));

        // Column widths from the visible page's contents.
        let labels: Vec<String> = runs[page.clone()].iter().map(|r| r.display_label()).collect();
        self.label_width = clamp_width(
            labels.iter().map(|l| l.width()).max().unwrap_or(3).max(3),
            3,
            MAX_LABEL,
        );
        self.column_widths = names
            .iter()
            .map(|name| {
                let widest_cell = page
                    .clone()
                    .filter_map(|row| app.session.cell_value(row, name))
                    .map(|v| v.to_string().width())
                    .max()
                    .unwrap_or(1);
                clamp_width(name.width().max(widest_cell), MIN_COL, MAX_COL)
            })
            .collect();

        let mut lines: Vec<Line> = Vec::with_capacity(page_len + 2);
        let mut header = vec![Span::styled(fit("Run", self.label_width), theme::header_style())];
        for (name, width) in names.iter().zip(&self.column_widths) {
            header.push(Span::raw(" "));
            header.push(Span::styled(fit(name, *width), theme::header_style()));
        }
        lines.push(Line::from(header));

        for (page_row, row) in page.clone().enumerate() {
            let mut spans = vec![Span::styled(
                fit(&labels[page_row], self.label_width),
                theme::muted_style(),
            )];
            for (col, name) in names.iter().enumerate() {
                let text = app
                    .session
                    .cell_value(row, name)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "–".to_string());
                let selected = app.session.selection().is_selected(name, row);
                let under_cursor =
                    focused && page_row == self.cursor_row && col == self.cursor_col;
                let style = match (selected, under_cursor) {
                    (true, true) => theme::selected_cursor_cell_style(),
                    (true, false) => theme::selected_cell_style(),
                    (false, true) => theme::cursor_cell_style(),
                    (false, false) => ratatui::style::Style::default(),
                };
                spans.push(Span::raw(" "));
                spans.push(Span::styled(fit(&text, self.column_widths[col]), style));
            }
            lines.push(Line::from(spans));
        }

        frame.render_widget(Paragraph::new(lines), inner);

        // Pagination summary on the block's bottom edge.
        let pager_info = app.session.pager().info(runs.len());
        let info_area = Rect {
            x: inner.x,
            y: rect.bottom().saturating_sub(1),
            width: inner.width,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Span::styled(pager_info, theme::muted_style())),
            info_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_pads_and_truncates_to_display_width() {
        assert_eq!(fit("cat", 5), "cat  ");
        assert_eq!(fit("elephant", 5), "elep…");
        assert_eq!(fit("", 3), "   ");
    }

    #[test]
    fn clamp_width_respects_bounds() {
        assert_eq!(clamp_width(2, MIN_COL, MAX_COL), MIN_COL);
        assert_eq!(clamp_width(40, MIN_COL, MAX_COL), MAX_COL);
        assert_eq!(clamp_width(9, MIN_COL, MAX_COL), 9);
    }
}
