//! Application state and update logic for the dashboard TUI.
//!
//! `App` owns the cross-cutting context (config, adapter handles), the
//! session state from `relaunch-session`, and the inline status line.
//! Components translate key and mouse events into calls on `App` and return
//! [`Effect`]s; the runtime executes effects (spawning adapter calls) and
//! feeds their outcomes back as [`Msg`]s through [`App::update`].

use std::sync::Arc;

use relaunch_catalog::{BranchIndex, CatalogError, DispatchError, EventDispatcher, RunCatalog};
use relaunch_session::{LaunchRequest, SessionState};
use relaunch_types::{DashboardConfig, Run};
use tracing::{debug, info, warn};

/// Which pane currently receives key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Flow field and project/branch selectors.
    #[default]
    Scope,
    /// The run table.
    Table,
    /// The parameter form and Launch action.
    Form,
}

impl Focus {
    pub fn next(self) -> Focus {
        match self {
            Focus::Scope => Focus::Table,
            Focus::Table => Focus::Form,
            Focus::Form => Focus::Scope,
        }
    }

    pub fn prev(self) -> Focus {
        match self {
            Focus::Scope => Focus::Form,
            Focus::Table => Focus::Scope,
            Focus::Form => Focus::Table,
        }
    }
}

/// Severity of the inline status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
    Success,
}

/// Session-scoped inline message; the only place adapter failures surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub level: StatusLevel,
    pub text: String,
}

/// Outcomes of spawned adapter calls, delivered to [`App::update`].
///
/// Catalog outcomes carry the generation of the load that produced them;
/// responses from a superseded load are dropped on arrival.
#[derive(Debug)]
pub enum Msg {
    BranchesLoaded {
        generation: u64,
        result: Result<BranchIndex, CatalogError>,
    },
    RunsLoaded {
        generation: u64,
        result: Result<Vec<Run>, CatalogError>,
    },
    LaunchFinished {
        summary: String,
        result: Result<(), DispatchError>,
    },
}

/// Side effects components request; the runtime executes them.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadBranches {
        flow: String,
        generation: u64,
    },
    LoadRuns {
        flow: String,
        project: Option<String>,
        branch: Option<String>,
        generation: u64,
    },
    Launch(LaunchRequest),
    Quit,
}

/// Cross-cutting shared context owned by the App.
pub struct SharedCtx {
    pub config: DashboardConfig,
    pub catalog: Arc<dyn RunCatalog>,
    pub dispatcher: Arc<dyn EventDispatcher>,
}

/// The main application state for one operator session.
pub struct App {
    pub ctx: SharedCtx,
    pub session: SessionState,
    /// Project to branch listings, loaded per flow in the scoped variant.
    pub branches: BranchIndex,
    pub focus: Focus,
    pub status: Option<Status>,
    /// A catalog read is in flight.
    pub loading: bool,
    /// Generation of the newest catalog load; older in-flight responses
    /// are stale and must not be applied.
    catalog_gen: u64,
    /// A launch is in flight; further launch actions are ignored.
    pub launching: bool,
    /// The view no longer matches the state and must be redrawn.
    pub dirty: bool,
}

impl App {
    pub fn new(
        config: DashboardConfig,
        catalog: Arc<dyn RunCatalog>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        let session = SessionState::new(&config);
        Self {
            ctx: SharedCtx {
                config,
                catalog,
                dispatcher,
            },
            session,
            branches: BranchIndex::new(),
            focus: Focus::default(),
            status: None,
            loading: false,
            catalog_gen: 0,
            launching: false,
            dirty: true,
        }
    }

    pub fn set_status(&mut self, level: StatusLevel, text: impl Into<String>) {
        self.status = Some(Status {
            level,
            text: text.into(),
        });
        self.dirty = true;
    }

    /// Effects to run before the first interaction: load the configured
    /// scope if a flow name is present.
    pub fn initial_effects(&mut self) -> Vec<Effect> {
        self.reload_catalog()
    }

    /// Begin loading the catalog for the current scope. In the scoped
    /// variant this goes through the branch listing first; otherwise it
    /// lists runs directly against the ambient namespace.
    pub fn reload_catalog(&mut self) -> Vec<Effect> {
        let flow = self.session.scope().flow.trim().to_string();
        if flow.is_empty() {
            self.session.clear_runs();
            self.branches.clear();
            self.set_status(StatusLevel::Info, "Enter a flow name to continue.");
            return Vec::new();
        }
        self.loading = true;
        self.catalog_gen += 1;
        self.set_status(StatusLevel::Info, format!("Loading {flow}…"));
        if self.ctx.config.project_scoped {
            self.branches.clear();
            vec![Effect::LoadBranches {
                flow,
                generation: self.catalog_gen,
            }]
        } else {
            vec![Effect::LoadRuns {
                flow,
                project: None,
                branch: None,
                generation: self.catalog_gen,
            }]
        }
    }

    /// Re-list runs for the current scope without reloading branches.
    /// Used when the project or branch selector changes.
    pub fn reload_runs(&mut self) -> Vec<Effect> {
        let scope = self.session.scope();
        let flow = scope.flow.trim().to_string();
        if flow.is_empty() {
            return Vec::new();
        }
        let (project, branch) = if self.ctx.config.project_scoped {
            (scope.project.clone(), self.resolved_branch_internal())
        } else {
            (None, None)
        };
        self.loading = true;
        self.catalog_gen += 1;
        vec![Effect::LoadRuns {
            flow,
            project,
            branch,
            generation: self.catalog_gen,
        }]
    }

    /// A response from a load that has since been superseded by a newer
    /// reload must not touch the table or the loading flag.
    fn superseded(&self, generation: u64, what: &str) -> bool {
        if generation == self.catalog_gen {
            return false;
        }
        debug!(generation, current = self.catalog_gen, "dropping stale {what}");
        true
    }

    /// The internal registry name of the currently selected branch.
    pub fn resolved_branch_internal(&self) -> Option<String> {
        let scope = self.session.scope();
        let project = scope.project.as_ref()?;
        let display = scope.branch.as_ref()?;
        self.branches
            .get(project)?
            .iter()
            .find(|b| &b.display == display)
            .map(|b| b.internal.clone())
    }

    /// Keep the scope's project/branch pointing at entries that exist in
    /// the loaded branch index, falling back to the first of each.
    fn normalize_scope(&mut self) {
        let scope = self.session.scope_mut();
        let valid_project = scope
            .project
            .as_ref()
            .is_some_and(|p| self.branches.contains_key(p));
        if !valid_project {
            scope.project = self.branches.keys().next().cloned();
        }
        let branches = scope
            .project
            .as_ref()
            .and_then(|p| self.branches.get(p))
            .map(Vec::as_slice)
            .unwrap_or_default();
        let valid_branch = scope
            .branch
            .as_ref()
            .is_some_and(|d| branches.iter().any(|b| &b.display == d));
        if !valid_branch {
            scope.branch = branches.first().map(|b| b.display.clone());
        }
    }

    /// Validate and kick off a launch. Validation failures surface inline
    /// and never reach the dispatcher.
    pub fn request_launch(&mut self) -> Vec<Effect> {
        if self.launching {
            return Vec::new();
        }
        match self.session.build_launch() {
            Ok(request) => {
                self.launching = true;
                self.set_status(
                    StatusLevel::Info,
                    format!("Launching {}…", request.event_name),
                );
                vec![Effect::Launch(request)]
            }
            Err(err) => {
                self.set_status(StatusLevel::Error, err.to_string());
                Vec::new()
            }
        }
    }

    /// Put the shareable scope query string on the status line.
    pub fn share_scope(&mut self) {
        let query = self.session.scope().to_query();
        self.set_status(StatusLevel::Info, format!("Scope: {query}"));
    }

    /// Fold one adapter outcome into the state, possibly producing
    /// follow-up effects.
    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        self.dirty = true;
        match msg {
            Msg::BranchesLoaded { generation, result: Ok(index) } => {
                if self.superseded(generation, "branch listing") {
                    return Vec::new();
                }
                if index.is_empty() {
                    self.loading = false;
                    self.session.clear_runs();
                    self.set_status(
                        StatusLevel::Warn,
                        format!("No projects found for flow {}.", self.session.scope().flow),
                    );
                    return Vec::new();
                }
                self.branches = index;
                self.normalize_scope();
                self.reload_runs()
            }
            Msg::BranchesLoaded { generation, result: Err(err) } => {
                if self.superseded(generation, "branch listing") {
                    return Vec::new();
                }
                self.loading = false;
                self.session.clear_runs();
                warn!(%err, "branch listing failed");
                self.set_status(
                    StatusLevel::Error,
                    format!("Could not load flow {}: {err}", self.session.scope().flow),
                );
                Vec::new()
            }
            Msg::RunsLoaded { generation, result: Ok(runs) } => {
                if self.superseded(generation, "run listing") {
                    return Vec::new();
                }
                self.loading = false;
                if runs.is_empty() {
                    self.session.clear_runs();
                    self.set_status(StatusLevel::Warn, "No runs found.");
                } else {
                    let count = runs.len();
                    self.session.apply_runs(runs);
                    self.focus = Focus::Table;
                    self.set_status(StatusLevel::Info, format!("Loaded {count} runs."));
                }
                Vec::new()
            }
            Msg::RunsLoaded { generation, result: Err(err) } => {
                if self.superseded(generation, "run listing") {
                    return Vec::new();
                }
                self.loading = false;
                self.session.clear_runs();
                warn!(%err, "run listing failed");
                self.set_status(StatusLevel::Error, format!("Could not load runs: {err}"));
                Vec::new()
            }
            Msg::LaunchFinished { summary, result } => {
                self.launching = false;
                match result {
                    Ok(()) => {
                        info!(summary, "launch published");
                        self.set_status(
                            StatusLevel::Success,
                            format!("Experiment launched with {summary}"),
                        );
                    }
                    Err(err) => {
                        // Edited values stay untouched so the operator can
                        // retry without re-entering them.
                        warn!(%err, "launch failed");
                        self.set_status(StatusLevel::Error, format!("Failed to launch: {err}"));
                    }
                }
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use indexmap::IndexMap;
    use relaunch_catalog::{InMemoryCatalog, RecordingDispatcher};
    use relaunch_types::{Branch, ParamValue, Scope};

    fn run(id: &str) -> Run {
        let mut parameters = IndexMap::new();
        parameters.insert("count".to_string(), ParamValue::Int(5));
        Run {
            id: id.to_string(),
            created_at: Utc::now(),
            event_name: Some("launch_experiment".to_string()),
            parameters,
        }
    }

    fn app(config: DashboardConfig) -> App {
        App::new(
            config,
            Arc::new(InMemoryCatalog::default()),
            Arc::new(RecordingDispatcher::default()),
        )
    }

    fn scoped_config(flow: &str) -> DashboardConfig {
        DashboardConfig {
            scope: Scope::new(flow),
            project_scoped: true,
            ..DashboardConfig::default()
        }
    }

    #[test]
    fn empty_flow_asks_for_a_name_instead_of_loading() {
        let mut app = app(DashboardConfig::default());
        assert!(app.initial_effects().is_empty());
        assert_eq!(app.status.as_ref().unwrap().level, StatusLevel::Info);
    }

    #[test]
    fn scoped_variant_loads_branches_first() {
        let mut app = app(scoped_config("CascadingParameters"));
        let effects = app.initial_effects();
        assert_eq!(
            effects,
            vec![Effect::LoadBranches {
                flow: "CascadingParameters".to_string(),
                generation: 1,
            }]
        );
        assert!(app.loading);
    }

    #[test]
    fn branch_listing_resolves_scope_and_lists_runs() {
        let mut app = app(scoped_config("Flow"));
        let mut index = BranchIndex::new();
        index.insert(
            "vision".to_string(),
            vec![
                Branch::from_internal("prod").unwrap(),
                Branch::from_internal("test.sandbox").unwrap(),
            ],
        );

        let effects = app.update(Msg::BranchesLoaded {
            generation: 0,
            result: Ok(index),
        });
        assert_eq!(
            effects,
            vec![Effect::LoadRuns {
                flow: "Flow".to_string(),
                project: Some("vision".to_string()),
                branch: Some("prod".to_string()),
                generation: 1,
            }]
        );
        assert_eq!(app.session.scope().branch.as_deref(), Some("main"));
    }

    #[test]
    fn stale_scope_from_query_falls_back_to_first_entries() {
        let mut app = app(DashboardConfig {
            scope: Scope {
                flow: "Flow".into(),
                project: Some("gone".into()),
                branch: Some("gone_branch".into()),
            },
            project_scoped: true,
            ..DashboardConfig::default()
        });
        let mut index = BranchIndex::new();
        index.insert(
            "vision".to_string(),
            vec![Branch::from_internal("prod").unwrap()],
        );
        app.update(Msg::BranchesLoaded {
            generation: 0,
            result: Ok(index),
        });
        assert_eq!(app.session.scope().project.as_deref(), Some("vision"));
        assert_eq!(app.session.scope().branch.as_deref(), Some("main"));
    }

    #[test]
    fn empty_branch_index_is_a_warning_not_a_crash() {
        let mut app = app(scoped_config("Flow"));
        let effects = app.update(Msg::BranchesLoaded {
            generation: 0,
            result: Ok(BranchIndex::new()),
        });
        assert!(effects.is_empty());
        assert!(!app.loading);
        assert_eq!(app.status.as_ref().unwrap().level, StatusLevel::Warn);
    }

    #[test]
    fn empty_run_list_warns_and_clears_the_table() {
        let mut app = app(scoped_config("Flow"));
        app.update(Msg::RunsLoaded {
            generation: 0,
            result: Ok(Vec::new()),
        });
        assert_eq!(app.status.as_ref().unwrap().text, "No runs found.");
        assert!(app.session.runs().is_empty());
    }

    #[test]
    fn loaded_runs_move_focus_to_the_table() {
        let mut app = app(scoped_config("Flow"));
        app.update(Msg::RunsLoaded {
            generation: 0,
            result: Ok(vec![run("1"), run("2")]),
        });
        assert_eq!(app.focus, Focus::Table);
        assert_eq!(app.session.runs().len(), 2);
    }

    #[test]
    fn catalog_failure_surfaces_inline_with_the_reason() {
        let mut app = app(scoped_config("Flow"));
        app.update(Msg::RunsLoaded {
            generation: 0,
            result: Err(CatalogError::Transport("connection refused".to_string())),
        });
        let status = app.status.as_ref().unwrap();
        assert_eq!(status.level, StatusLevel::Error);
        assert!(status.text.contains("connection refused"));
    }

    #[test]
    fn launch_validation_failure_never_produces_a_dispatch_effect() {
        let mut app = app(DashboardConfig::default());
        let effects = app.request_launch();
        assert!(effects.is_empty());
        assert_eq!(app.status.as_ref().unwrap().level, StatusLevel::Error);
    }

    #[test]
    fn launch_failure_keeps_edited_values_for_retry() {
        let mut app = app(scoped_config("Flow"));
        app.update(Msg::RunsLoaded {
            generation: 0,
            result: Ok(vec![run("1")]),
        });
        app.session.toggle_cell(0, "count");

        let effects = app.request_launch();
        assert_eq!(effects.len(), 1);
        app.update(Msg::LaunchFinished {
            summary: "launch_experiment {count=5}".to_string(),
            result: Err(DispatchError::Rejected {
                event: "launch_experiment".to_string(),
                status: 503,
                reason: "bus down".to_string(),
            }),
        });
        assert!(!app.launching);
        assert!(app.status.as_ref().unwrap().text.contains("bus down"));
        assert_eq!(
            app.session.edited_values()["count"],
            ParamValue::Int(5)
        );
    }

    #[test]
    fn double_launch_is_ignored_while_in_flight() {
        let mut app = app(scoped_config("Flow"));
        app.update(Msg::RunsLoaded {
            generation: 0,
            result: Ok(vec![run("1")]),
        });
        assert_eq!(app.request_launch().len(), 1);
        assert!(app.request_launch().is_empty());
    }

    #[test]
    fn superseded_run_listing_is_dropped_on_arrival() {
        let mut app = app(scoped_config("Flow"));
        // Two reloads back to back, as when the operator cycles the scope
        // twice before the first response lands.
        app.reload_runs();
        let effects = app.reload_runs();
        let Effect::LoadRuns { generation, .. } = effects[0].clone() else {
            panic!("expected a run load");
        };

        app.update(Msg::RunsLoaded {
            generation,
            result: Ok(vec![run("fresh")]),
        });
        assert_eq!(app.session.runs()[0].id, "fresh");
        assert!(!app.loading);

        // The first reload finishes late; its rows must not replace the
        // newer scope's table.
        app.update(Msg::RunsLoaded {
            generation: generation - 1,
            result: Ok(vec![run("stale")]),
        });
        assert_eq!(app.session.runs()[0].id, "fresh");
        assert!(!app.loading);
    }

    #[test]
    fn superseded_failure_does_not_clear_a_fresh_table() {
        let mut app = app(scoped_config("Flow"));
        app.reload_runs();
        let effects = app.reload_runs();
        let Effect::LoadRuns { generation, .. } = effects[0].clone() else {
            panic!("expected a run load");
        };

        app.update(Msg::RunsLoaded {
            generation,
            result: Ok(vec![run("fresh")]),
        });
        app.update(Msg::RunsLoaded {
            generation: generation - 1,
            result: Err(CatalogError::Transport("connection refused".to_string())),
        });
        assert_eq!(app.session.runs().len(), 1);
        assert_eq!(app.status.as_ref().unwrap().level, StatusLevel::Info);
    }

    #[test]
    fn superseded_branch_listing_is_dropped_on_arrival() {
        let mut app = app(scoped_config("Flow"));
        app.initial_effects();
        let effects = app.reload_catalog();
        let Effect::LoadBranches { generation, .. } = effects[0].clone() else {
            panic!("expected a branch load");
        };

        let mut index = BranchIndex::new();
        index.insert(
            "vision".to_string(),
            vec![Branch::from_internal("prod").unwrap()],
        );
        let follow_ups = app.update(Msg::BranchesLoaded {
            generation: generation - 1,
            result: Ok(index),
        });
        assert!(follow_ups.is_empty());
        assert!(app.branches.is_empty());
        assert!(app.loading);
    }
}
