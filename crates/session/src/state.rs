//! The session-scoped context object owned by the presentation shell.

use indexmap::IndexMap;
use relaunch_types::{DashboardConfig, EventSource, ParamValue, Run, Scope};
use tracing::debug;

use crate::form::ParamForm;
use crate::launch::{LaunchError, LaunchRequest};
use crate::pager::Pager;
use crate::selection::SelectionState;

/// All mutable state for one operator session: scope, loaded runs,
/// selections, form controls and the table page.
///
/// Initialization is well defined (empty selections, page 0, type defaults)
/// and there is no lifecycle beyond the session. Every operator action maps
/// to one method here; the shell redraws everything afterwards.
#[derive(Debug)]
pub struct SessionState {
    scope: Scope,
    event_source: EventSource,
    runs: Vec<Run>,
    selection: SelectionState,
    form: ParamForm,
    pager: Pager,
}

impl SessionState {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            scope: config.scope.clone(),
            event_source: config.event_source(),
            runs: Vec::new(),
            selection: SelectionState::default(),
            form: ParamForm::new(config.form_mode),
            pager: Pager::new(config.page_size()),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn form(&self) -> &ParamForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ParamForm {
        &mut self.form
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// Known parameter names in catalog order.
    pub fn parameter_names(&self) -> Vec<String> {
        self.form
            .fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect()
    }

    /// Replace the loaded catalog: rebuilds the form (fresh kinds and
    /// defaults), clears selections and returns to page 0.
    pub fn apply_runs(&mut self, runs: Vec<Run>) {
        let mode = self.form.mode();
        self.form = ParamForm::from_runs(&runs, mode);
        self.selection.clear();
        self.runs = runs;
        self.pager.first();
        debug!(
            runs = self.runs.len(),
            parameters = self.form.fields().len(),
            "catalog applied"
        );
    }

    /// Drop loaded data (scope changed, reload pending). Selections do not
    /// survive a scope change.
    pub fn clear_runs(&mut self) {
        self.apply_runs(Vec::new());
    }

    /// Absolute row indices visible on the current table page.
    pub fn page_rows(&self) -> std::ops::Range<usize> {
        self.pager.bounds(self.runs.len())
    }

    pub fn page_next(&mut self) {
        self.pager.next(self.runs.len());
    }

    pub fn page_prev(&mut self) {
        self.pager.prev();
    }

    /// The value recorded in one table cell, if that run has the parameter.
    pub fn cell_value(&self, row: usize, param: &str) -> Option<&ParamValue> {
        self.runs.get(row)?.parameters.get(param)
    }

    /// Toggle one table cell's selection, mirroring the change into the
    /// form control. Returns false for cells with no recorded value.
    pub fn toggle_cell(&mut self, row: usize, param: &str) -> bool {
        let Some(value) = self.cell_value(row, param).cloned() else {
            return false;
        };
        let outcome = self.selection.toggle(param, row, value);
        self.form.apply_toggle(param, &outcome);
        debug!(param, row, ?outcome, "cell toggled");
        true
    }

    /// The Edited Value Set for the current render pass.
    pub fn edited_values(&self) -> IndexMap<String, ParamValue> {
        self.form.edited_values(&self.selection)
    }

    /// Assemble the launch request, or refuse with a validation error.
    /// Refusal means the dispatcher is never invoked.
    pub fn build_launch(&self) -> Result<LaunchRequest, LaunchError> {
        if self.runs.is_empty() {
            return Err(LaunchError::NoRunsLoaded);
        }
        let payload = self.edited_values();
        if payload.is_empty() {
            // Only reachable in selected-only mode; show-all always carries
            // every known parameter.
            return Err(LaunchError::NothingSelected);
        }
        let event_name = match &self.event_source {
            EventSource::Static(name) => name.clone(),
            EventSource::FromRun => self
                .runs
                .first()
                .and_then(|run| run.event_name.clone())
                .ok_or(LaunchError::MissingEventName)?,
        };
        Ok(LaunchRequest {
            event_name,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use relaunch_types::FormMode;

    fn run(id: &str, count: i64, ratio: f64) -> Run {
        let mut parameters = IndexMap::new();
        parameters.insert("count".to_string(), ParamValue::Int(count));
        parameters.insert("ratio".to_string(), ParamValue::Float(ratio));
        Run {
            id: id.to_string(),
            created_at: Utc::now(),
            event_name: Some("launch_experiment".to_string()),
            parameters,
        }
    }

    fn session(mode: FormMode) -> SessionState {
        let config = DashboardConfig {
            form_mode: mode,
            ..DashboardConfig::default()
        };
        let mut session = SessionState::new(&config);
        session.apply_runs(vec![
            run("1", 5, 0.1),
            run("2", 7, 0.9),
            run("3", 5, 0.1),
        ]);
        session
    }

    #[test]
    fn select_then_deselect_reverts_to_type_default() {
        // Catalog: count [5, 7, 5], ratio [0.1, 0.9, 0.1]. Select row 2's
        // cells, then click row 2's count again to deselect it.
        let mut session = session(FormMode::ShowAll);
        session.toggle_cell(1, "count");
        session.toggle_cell(1, "ratio");
        session.toggle_cell(1, "count");

        let values = session.edited_values();
        assert_eq!(values["count"], ParamValue::Int(0));
        assert_eq!(values["ratio"], ParamValue::Float(0.9));
    }

    #[test]
    fn harvest_covers_known_parameters_regardless_of_run_count() {
        let session = session(FormMode::ShowAll);
        let values = session.edited_values();
        let names: Vec<&str> = values.keys().map(String::as_str).collect();
        assert_eq!(names, ["count", "ratio"]);
    }

    #[test]
    fn launch_with_no_selection_is_refused_in_selected_only_mode() {
        let session = session(FormMode::SelectedOnly);
        assert_eq!(session.build_launch(), Err(LaunchError::NothingSelected));
    }

    #[test]
    fn launch_in_show_all_mode_carries_every_parameter() {
        let mut session = session(FormMode::ShowAll);
        session.toggle_cell(1, "ratio");
        let request = session.build_launch().unwrap();
        assert_eq!(request.event_name, "launch_experiment");
        assert_eq!(request.payload["count"], ParamValue::Int(0));
        assert_eq!(request.payload["ratio"], ParamValue::Float(0.9));
    }

    #[test]
    fn static_event_name_overrides_run_metadata() {
        let config = DashboardConfig {
            event_name: Some("fixed_event".to_string()),
            ..DashboardConfig::default()
        };
        let mut session = SessionState::new(&config);
        session.apply_runs(vec![run("1", 5, 0.1)]);
        let request = session.build_launch().unwrap();
        assert_eq!(request.event_name, "fixed_event");
    }

    #[test]
    fn missing_event_name_is_a_launch_error_not_a_panic() {
        let mut session = SessionState::new(&DashboardConfig::default());
        let mut bare = run("1", 5, 0.1);
        bare.event_name = None;
        session.apply_runs(vec![bare]);
        assert_eq!(session.build_launch(), Err(LaunchError::MissingEventName));
    }

    #[test]
    fn launch_without_runs_is_refused() {
        let session = SessionState::new(&DashboardConfig::default());
        assert_eq!(session.build_launch(), Err(LaunchError::NoRunsLoaded));
    }

    #[test]
    fn applying_runs_resets_selection_and_page() {
        let mut session = session(FormMode::ShowAll);
        session.toggle_cell(2, "count");
        session.page_next();

        session.apply_runs(vec![run("9", 1, 0.5)]);
        assert!(session.selection().is_empty());
        assert_eq!(session.pager().page(), 0);
        assert_eq!(session.edited_values()["count"], ParamValue::Int(0));
    }

    #[test]
    fn toggling_a_missing_cell_is_a_noop() {
        let mut session = session(FormMode::ShowAll);
        assert!(!session.toggle_cell(7, "count"));
        assert!(!session.toggle_cell(0, "nope"));
        assert!(session.selection().is_empty());
    }
}
