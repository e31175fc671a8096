//! Bottom bar: the inline status message plus key hints for the focused pane.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{App, Focus};
use crate::theme;
use crate::ui::components::component::Component;

#[derive(Default)]
pub struct StatusLine;

fn hint_spans(pairs: &[(&'static str, &'static str)]) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (key, action) in pairs {
        spans.push(Span::styled(*key, theme::hint_key_style()));
        spans.push(Span::styled(*action, theme::hint_text_style()));
    }
    spans
}

fn hints_for(focus: Focus, launching: bool) -> Vec<Span<'static>> {
    if launching {
        return vec![Span::styled("Launching…", theme::hint_text_style())];
    }
    let mut pairs = vec![("Tab", " focus  ")];
    match focus {
        Focus::Scope => {
            pairs.push(("Enter", " set flow  "));
            pairs.push(("←/→", " change  "));
            pairs.push(("↑/↓", " field  "));
        }
        Focus::Table => {
            pairs.push(("↑↓←→", " move  "));
            pairs.push(("Enter", " select  "));
            pairs.push(("n/p", " page  "));
            pairs.push(("r", " reload  "));
            pairs.push(("q", " quit  "));
        }
        Focus::Form => {
            pairs.push(("↑/↓", " field  "));
            pairs.push(("Space", " toggle  "));
            pairs.push(("Enter", " launch  "));
        }
    }
    pairs.push(("Ctrl-y", " share scope  "));
    pairs.push(("Ctrl-c", " quit"));
    hint_spans(&pairs)
}

impl Component for StatusLine {
    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let status = match &app.status {
            Some(status) => Line::from(Span::styled(
                status.text.clone(),
                theme::status_style(status.level),
            )),
            None if app.loading => {
                Line::from(Span::styled("Loading…", theme::muted_style()))
            }
            None => Line::default(),
        };
        let rows = Rect {
            height: area.height.min(1),
            ..area
        };
        frame.render_widget(Paragraph::new(status), rows);
        if area.height > 1 {
            let hints = Rect {
                y: area.y + 1,
                height: 1,
                ..area
            };
            frame.render_widget(
                Paragraph::new(Line::from(hints_for(app.focus, app.launching))),
                hints,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_hints_include_paging_and_reload() {
        let spans = hints_for(Focus::Table, false);
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("n/p"));
        assert!(text.contains("reload"));
        assert!(text.contains("Ctrl-y"));
    }

    #[test]
    fn launching_replaces_hints() {
        let spans = hints_for(Focus::Form, true);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content.as_ref(), "Launching…");
    }
}
