//! Scope bar: flow name field plus project/branch selectors.
//!
//! The flow field is free text, committed with Enter, which (re)loads the
//! catalog. In the project-scoped deployment two selectors follow, cycled
//! with ←/→; changing either re-lists runs for the new scope. The whole
//! bar mirrors the shareable scope query string.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{App, Effect, Focus};
use crate::theme;
use crate::ui::components::component::Component;
use crate::ui::components::text_input::TextInputState;

/// Which control inside the bar is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ScopeField {
    #[default]
    Flow,
    Project,
    Branch,
}

pub(crate) struct ScopeBar {
    flow_input: TextInputState,
    field: ScopeField,
    area: Rect,
}

impl ScopeBar {
    pub fn new(app: &App) -> Self {
        Self {
            flow_input: TextInputState::with_text(app.session.scope().flow.clone()),
            field: ScopeField::default(),
            area: Rect::default(),
        }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    fn selectors_available(&self, app: &App) -> bool {
        app.ctx.config.project_scoped && !app.branches.is_empty()
    }

    fn next_field(&mut self, app: &App, forward: bool) {
        if !self.selectors_available(app) {
            self.field = ScopeField::Flow;
            return;
        }
        self.field = match (self.field, forward) {
            (ScopeField::Flow, true) => ScopeField::Project,
            (ScopeField::Project, true) => ScopeField::Branch,
            (ScopeField::Branch, true) => ScopeField::Flow,
            (ScopeField::Flow, false) => ScopeField::Branch,
            (ScopeField::Project, false) => ScopeField::Flow,
            (ScopeField::Branch, false) => ScopeField::Project,
        };
    }

    /// Step the project selector and re-list runs for the new scope. The
    /// branch selector snaps to the new project's first branch.
    fn cycle_project(&self, app: &mut App, delta: isize) -> Vec<Effect> {
        let projects: Vec<String> = app.branches.keys().cloned().collect();
        if projects.is_empty() {
            return Vec::new();
        }
        let current = app
            .session
            .scope()
            .project
            .as_ref()
            .and_then(|p| projects.iter().position(|candidate| candidate == p))
            .unwrap_or(0);
        let next = step_index(current, projects.len(), delta);
        let project = projects[next].clone();
        let first_branch = app
            .branches
            .get(&project)
            .and_then(|branches| branches.first())
            .map(|b| b.display.clone());

        let scope = app.session.scope_mut();
        scope.project = Some(project);
        scope.branch = first_branch;
        app.dirty = true;
        app.reload_runs()
    }

    /// Step the branch selector within the current project.
    fn cycle_branch(&self, app: &mut App, delta: isize) -> Vec<Effect> {
        let Some(project) = app.session.scope().project.clone() else {
            return Vec::new();
        };
        let displays: Vec<String> = app
            .branches
            .get(&project)
            .map(|branches| branches.iter().map(|b| b.display.clone()).collect())
            .unwrap_or_default();
        if displays.is_empty() {
            return Vec::new();
        }
        let current = app
            .session
            .scope()
            .branch
            .as_ref()
            .and_then(|d| displays.iter().position(|candidate| candidate == d))
            .unwrap_or(0);
        let next = step_index(current, displays.len(), delta);
        app.session.scope_mut().branch = Some(displays[next].clone());
        app.dirty = true;
        app.reload_runs()
    }

    fn selector_spans<'a>(
        &self,
        label: &'a str,
        value: Option<&'a str>,
        active: bool,
        focused: bool,
    ) -> Vec<Span<'a>> {
        let value_style = if focused && active {
            theme::cursor_cell_style()
        } else {
            theme::header_style()
        };
        vec![
            Span::styled(format!("{label}: "), theme::muted_style()),
            Span::styled("◂ ", theme::muted_style()),
            Span::styled(value.unwrap_or("–"), value_style),
            Span::styled(" ▸", theme::muted_style()),
            Span::raw("   "),
        ]
    }
}

fn step_index(current: usize, len: usize, delta: isize) -> usize {
    let len = len as isize;
    (current as isize + delta).rem_euclid(len) as usize
}

impl Component for ScopeBar {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match (self.field, key.code) {
            (_, KeyCode::Up) => {
                self.next_field(app, false);
                app.dirty = true;
                Vec::new()
            }
            (_, KeyCode::Down) => {
                self.next_field(app, true);
                app.dirty = true;
                Vec::new()
            }
            (ScopeField::Flow, KeyCode::Enter) => {
                app.session.scope_mut().flow = self.flow_input.text().trim().to_string();
                // A new flow invalidates the project/branch selection.
                let scope = app.session.scope_mut();
                scope.project = None;
                scope.branch = None;
                self.field = ScopeField::Flow;
                app.reload_catalog()
            }
            (ScopeField::Flow, _) => {
                if self.flow_input.handle_key(&key) {
                    app.dirty = true;
                }
                Vec::new()
            }
            (ScopeField::Project, KeyCode::Left) => self.cycle_project(app, -1),
            (ScopeField::Project, KeyCode::Right) => self.cycle_project(app, 1),
            (ScopeField::Branch, KeyCode::Left) => self.cycle_branch(app, -1),
            (ScopeField::Branch, KeyCode::Right) => self.cycle_branch(app, 1),
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        self.area = rect;
        let focused = app.focus == Focus::Scope;
        if !self.selectors_available(app) {
            self.field = ScopeField::Flow;
        }

        let block = theme::block("Scope", focused);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let flow_style = if focused && self.field == ScopeField::Flow {
            theme::header_style()
        } else {
            theme::muted_style().patch(theme::header_style())
        };
        let mut spans = vec![
            Span::styled("Flow: ", theme::muted_style()),
            Span::styled(self.flow_input.text().to_string(), flow_style),
            Span::raw("   "),
        ];

        if app.ctx.config.project_scoped {
            let scope = app.session.scope();
            spans.extend(self.selector_spans(
                "Project",
                scope.project.as_deref(),
                self.field == ScopeField::Project,
                focused,
            ));
            spans.extend(self.selector_spans(
                "Branch",
                scope.branch.as_deref(),
                self.field == ScopeField::Branch,
                focused,
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), inner);

        if focused && self.field == ScopeField::Flow {
            let x = inner.x + "Flow: ".len() as u16 + self.flow_input.cursor_column();
            frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y));
        }
    }
}
