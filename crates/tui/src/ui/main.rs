//! Top-level view: layout, focus cycling, and event routing.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

use crate::app::{App, Effect, Focus};
use crate::ui::components::component::Component;
use crate::ui::components::param_form::ParamFormPane;
use crate::ui::components::run_table::RunTable;
use crate::ui::components::scope_bar::ScopeBar;
use crate::ui::components::status_line::StatusLine;

/// Width of the parameter form column.
const FORM_WIDTH: u16 = 34;

pub(crate) struct MainView {
    scope_bar: ScopeBar,
    run_table: RunTable,
    param_form: ParamFormPane,
    status_line: StatusLine,
}

impl MainView {
    pub fn new(app: &App) -> Self {
        Self {
            scope_bar: ScopeBar::new(app),
            run_table: RunTable::new(),
            param_form: ParamFormPane::new(),
            status_line: StatusLine,
        }
    }

    /// Handle a key event, dispatching global shortcuts first and the rest
    /// to whichever pane has focus.
    pub fn handle_key(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return vec![Effect::Quit],
                KeyCode::Char('y') => {
                    app.share_scope();
                    return Vec::new();
                }
                _ => {}
            }
        }
        match key.code {
            KeyCode::Tab => {
                app.focus = app.focus.next();
                app.dirty = true;
                return Vec::new();
            }
            KeyCode::BackTab => {
                app.focus = app.focus.prev();
                app.dirty = true;
                return Vec::new();
            }
            // 'q' quits from the table; the scope and form panes treat it
            // as text input.
            KeyCode::Char('q') if app.focus == Focus::Table => return vec![Effect::Quit],
            _ => {}
        }
        match app.focus {
            Focus::Scope => self.scope_bar.handle_key_events(app, key),
            Focus::Table => self.run_table.handle_key_events(app, key),
            Focus::Form => self.param_form.handle_key_events(app, key),
        }
    }

    /// Route a mouse event to the pane under the pointer; a click also
    /// moves focus there.
    pub fn handle_mouse(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        let position = Position::new(mouse.column, mouse.row);
        let clicked = matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left));
        if self.scope_bar.area().contains(position) {
            if clicked && app.focus != Focus::Scope {
                app.focus = Focus::Scope;
                app.dirty = true;
            }
            self.scope_bar.handle_mouse_events(app, mouse)
        } else if self.run_table.area().contains(position) {
            if clicked && app.focus != Focus::Table {
                app.focus = Focus::Table;
                app.dirty = true;
            }
            self.run_table.handle_mouse_events(app, mouse)
        } else if self.param_form.area().contains(position) {
            if clicked && app.focus != Focus::Form {
                app.focus = Focus::Form;
                app.dirty = true;
            }
            self.param_form.handle_mouse_events(app, mouse)
        } else {
            Vec::new()
        }
    }

    pub fn draw(&mut self, frame: &mut Frame, app: &mut App) {
        let [scope, body, status] = layout(frame.area());
        let [table, form] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(FORM_WIDTH)])
            .areas(body);

        self.scope_bar.render(frame, scope, app);
        self.run_table.render(frame, table, app);
        self.param_form.render(frame, form, app);
        self.status_line.render(frame, status, app);
    }
}

fn layout(area: Rect) -> [Rect; 3] {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(2),
        ])
        .areas(area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crossterm::event::KeyEventState;
    use relaunch_catalog::{InMemoryCatalog, RecordingDispatcher};
    use relaunch_types::DashboardConfig;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app() -> App {
        App::new(
            DashboardConfig::default(),
            Arc::new(InMemoryCatalog::default()),
            Arc::new(RecordingDispatcher::default()),
        )
    }

    #[test]
    fn ctrl_c_quits_regardless_of_focus() {
        let mut app = app();
        let mut view = MainView::new(&app);
        for focus in [Focus::Scope, Focus::Table, Focus::Form] {
            app.focus = focus;
            let effects = view.handle_key(&mut app, key(KeyCode::Char('c'), KeyModifiers::CONTROL));
            assert_eq!(effects, vec![Effect::Quit]);
        }
    }

    #[test]
    fn tab_cycles_focus_forward_and_back() {
        let mut app = app();
        let mut view = MainView::new(&app);
        view.handle_key(&mut app, key(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(app.focus, Focus::Table);
        view.handle_key(&mut app, key(KeyCode::BackTab, KeyModifiers::SHIFT));
        assert_eq!(app.focus, Focus::Scope);
    }

    #[test]
    fn q_only_quits_from_the_table() {
        let mut app = app();
        let mut view = MainView::new(&app);
        app.focus = Focus::Scope;
        assert!(
            view.handle_key(&mut app, key(KeyCode::Char('q'), KeyModifiers::NONE))
                .is_empty()
        );
        app.focus = Focus::Table;
        assert_eq!(
            view.handle_key(&mut app, key(KeyCode::Char('q'), KeyModifiers::NONE)),
            vec![Effect::Quit]
        );
    }

    #[test]
    fn ctrl_y_puts_the_scope_query_on_the_status_line() {
        let mut app = app();
        let mut view = MainView::new(&app);
        view.handle_key(&mut app, key(KeyCode::Char('y'), KeyModifiers::CONTROL));
        assert!(app.status.as_ref().unwrap().text.starts_with("Scope: "));
    }

    #[test]
    fn layout_reserves_scope_and_status_rows() {
        let [scope, body, status] = layout(Rect::new(0, 0, 80, 24));
        assert_eq!(scope.height, 3);
        assert_eq!(status.height, 2);
        assert_eq!(body.height, 19);
    }
}
