//! The parameter edit form: one typed control per known parameter.

use indexmap::IndexMap;
use relaunch_types::{FormMode, ParamValue, Run, ValueKind};

use crate::selection::{SelectionState, ToggleOutcome};

/// Fit a value into a control's kind.
///
/// Kinds are decided once per catalog load from the first non-missing
/// sample, so a selected historical value can disagree with its control
/// when value types vary across runs for one parameter name. Lossless
/// coercions are applied (Int into a Float control, anything into a Str
/// control); a non-coercible value falls back to the kind default rather
/// than corrupting the control.
pub fn coerce_to_kind(kind: ValueKind, value: ParamValue) -> ParamValue {
    match (kind, value) {
        (ValueKind::Bool, v @ ParamValue::Bool(_)) => v,
        (ValueKind::Int, v @ ParamValue::Int(_)) => v,
        (ValueKind::Float, v @ ParamValue::Float(_)) => v,
        (ValueKind::Float, ParamValue::Int(i)) => ParamValue::Float(i as f64),
        (ValueKind::Str, v) => ParamValue::Str(v.to_string()),
        (kind, _) => kind.default_value(),
    }
}

/// Whether `c` may be typed into a control of `kind`.
fn char_allowed(kind: ValueKind, c: char) -> bool {
    match kind {
        ValueKind::Bool => false,
        ValueKind::Int => c.is_ascii_digit() || c == '-',
        ValueKind::Float => c.is_ascii_digit() || matches!(c, '-' | '.' | 'e' | 'E' | '+'),
        ValueKind::Str => !c.is_control(),
    }
}

/// One editable control: a parameter name, its fixed kind, the last valid
/// value, and (for text-edited kinds) the raw edit buffer.
///
/// The buffer can transiently hold text that does not parse (`"-"` while
/// typing a negative number); `value` always carries the last successfully
/// parsed state, so harvesting the form mid-edit never yields garbage.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamField {
    name: String,
    kind: ValueKind,
    value: ParamValue,
    buffer: String,
}

impl ParamField {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        let mut field = Self {
            name: name.into(),
            kind,
            value: kind.default_value(),
            buffer: String::new(),
        };
        field.sync_buffer();
        field
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    /// Raw edit buffer as shown in the control.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Whether the buffer currently parses as the control's kind.
    pub fn buffer_valid(&self) -> bool {
        match self.kind {
            ValueKind::Bool | ValueKind::Str => true,
            ValueKind::Int => self.buffer.parse::<i64>().is_ok(),
            ValueKind::Float => self.buffer.parse::<f64>().is_ok(),
        }
    }

    /// Overwrite the control with a selected historical value.
    pub fn set_value(&mut self, value: ParamValue) {
        self.value = coerce_to_kind(self.kind, value);
        self.sync_buffer();
    }

    /// Reset the control to its type default.
    pub fn reset(&mut self) {
        self.value = self.kind.default_value();
        self.sync_buffer();
    }

    /// Flip a boolean control. No-op for other kinds.
    pub fn toggle(&mut self) {
        if let ParamValue::Bool(b) = self.value {
            self.value = ParamValue::Bool(!b);
        }
    }

    /// Step an integer control by `delta`. No-op for other kinds.
    pub fn step(&mut self, delta: i64) {
        if let ParamValue::Int(i) = self.value {
            self.value = ParamValue::Int(i.saturating_add(delta));
            self.sync_buffer();
        }
    }

    /// Type one character into a text-edited control.
    pub fn insert_char(&mut self, c: char) {
        if !char_allowed(self.kind, c) {
            return;
        }
        self.buffer.push(c);
        self.commit_buffer();
    }

    /// Delete the last character of a text-edited control.
    pub fn backspace(&mut self) {
        if matches!(self.kind, ValueKind::Bool) {
            return;
        }
        self.buffer.pop();
        self.commit_buffer();
    }

    fn commit_buffer(&mut self) {
        match self.kind {
            ValueKind::Bool => {}
            ValueKind::Str => self.value = ParamValue::Str(self.buffer.clone()),
            ValueKind::Int => {
                if let Ok(i) = self.buffer.parse::<i64>() {
                    self.value = ParamValue::Int(i);
                }
            }
            ValueKind::Float => {
                if let Ok(f) = self.buffer.parse::<f64>() {
                    self.value = ParamValue::Float(f);
                }
            }
        }
    }

    fn sync_buffer(&mut self) {
        self.buffer = match &self.value {
            ParamValue::Bool(_) => String::new(),
            other => other.to_string(),
        };
    }
}

/// The full parameter form for one loaded catalog.
///
/// Field order is catalog-derived: the columns of the first run, which is
/// the sole source of known parameters. Each field's kind is classified
/// once, from the first non-missing value across all loaded runs, and stays
/// fixed until the next catalog load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamForm {
    fields: Vec<ParamField>,
    mode: FormMode,
}

impl ParamForm {
    pub fn new(mode: FormMode) -> Self {
        Self {
            fields: Vec::new(),
            mode,
        }
    }

    /// Build the form for a freshly loaded catalog.
    pub fn from_runs(runs: &[Run], mode: FormMode) -> Self {
        let mut fields = Vec::new();
        if let Some(first) = runs.first() {
            for name in first.parameter_names() {
                let sample = runs.iter().find_map(|run| run.parameters.get(name));
                let kind = ValueKind::classify(sample);
                fields.push(ParamField::new(name, kind));
            }
        }
        Self { fields, mode }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn fields(&self) -> &[ParamField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&ParamField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut ParamField> {
        self.fields.iter_mut().find(|f| f.name() == name)
    }

    pub fn field_at(&self, index: usize) -> Option<&ParamField> {
        self.fields.get(index)
    }

    pub fn field_at_mut(&mut self, index: usize) -> Option<&mut ParamField> {
        self.fields.get_mut(index)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Mirror a selection toggle into the affected control.
    pub fn apply_toggle(&mut self, param: &str, outcome: &ToggleOutcome) {
        if let Some(field) = self.field_mut(param) {
            match outcome {
                ToggleOutcome::Selected(value) => field.set_value(value.clone()),
                ToggleOutcome::Deselected => field.reset(),
            }
        }
    }

    /// Indices of fields the form currently renders, honoring the mode.
    pub fn visible_indices(&self, selection: &SelectionState) -> Vec<usize> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| match self.mode {
                FormMode::ShowAll => true,
                FormMode::SelectedOnly => selection.get(f.name()).is_some(),
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Harvest the Edited Value Set for this render pass.
    ///
    /// In [`FormMode::ShowAll`] every known parameter appears exactly once;
    /// in [`FormMode::SelectedOnly`] only parameters with an active
    /// selection contribute.
    pub fn edited_values(&self, selection: &SelectionState) -> IndexMap<String, ParamValue> {
        self.fields
            .iter()
            .filter(|f| match self.mode {
                FormMode::ShowAll => true,
                FormMode::SelectedOnly => selection.get(f.name()).is_some(),
            })
            .map(|f| (f.name().to_string(), f.value().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn run(id: &str, params: &[(&str, ParamValue)]) -> Run {
        Run {
            id: id.to_string(),
            created_at: Utc::now(),
            event_name: Some("launch_experiment".into()),
            parameters: params
                .iter()
                .map(|(n, v)| (n.to_string(), v.clone()))
                .collect(),
        }
    }

    fn sample_runs() -> Vec<Run> {
        vec![
            run(
                "1",
                &[
                    ("animal1", ParamValue::Str("cat".into())),
                    ("count", ParamValue::Int(5)),
                    ("ratio", ParamValue::Float(0.1)),
                    ("dry_run", ParamValue::Bool(false)),
                ],
            ),
            run(
                "2",
                &[
                    ("animal1", ParamValue::Str("dog".into())),
                    ("count", ParamValue::Int(7)),
                    ("ratio", ParamValue::Float(0.9)),
                    ("dry_run", ParamValue::Bool(true)),
                ],
            ),
        ]
    }

    #[test]
    fn fields_follow_first_run_order_and_kinds() {
        let form = ParamForm::from_runs(&sample_runs(), FormMode::ShowAll);
        let names: Vec<&str> = form.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["animal1", "count", "ratio", "dry_run"]);
        assert_eq!(form.field("count").unwrap().kind(), ValueKind::Int);
        assert_eq!(form.field("ratio").unwrap().kind(), ValueKind::Float);
        assert_eq!(form.field("dry_run").unwrap().kind(), ValueKind::Bool);
    }

    #[test]
    fn parameters_missing_from_later_runs_still_classify() {
        // Older runs can predate a newly added parameter; the first run
        // defines the known set and the sample scan skips the gaps.
        let runs = vec![
            run(
                "2",
                &[("count", ParamValue::Int(7)), ("extra", ParamValue::Int(3))],
            ),
            run("1", &[("count", ParamValue::Int(5))]),
        ];
        let form = ParamForm::from_runs(&runs, FormMode::ShowAll);
        assert_eq!(form.field("extra").unwrap().kind(), ValueKind::Int);
        assert_eq!(form.fields().len(), 2);
    }

    #[test]
    fn show_all_harvest_equals_first_run_parameter_set() {
        let form = ParamForm::from_runs(&sample_runs(), FormMode::ShowAll);
        let selection = SelectionState::default();
        let values = form.edited_values(&selection);
        let names: Vec<&str> = values.keys().map(String::as_str).collect();
        assert_eq!(names, ["animal1", "count", "ratio", "dry_run"]);
        // Without selections every entry is the type default.
        assert_eq!(values["animal1"], ParamValue::Str(String::new()));
        assert_eq!(values["count"], ParamValue::Int(0));
        assert_eq!(values["ratio"], ParamValue::Float(0.0));
        assert_eq!(values["dry_run"], ParamValue::Bool(false));
    }

    #[test]
    fn selected_only_harvest_excludes_unselected_parameters() {
        let form = ParamForm::from_runs(&sample_runs(), FormMode::SelectedOnly);
        let mut selection = SelectionState::default();
        selection.toggle("count", 1, ParamValue::Int(7));

        let values = form.edited_values(&selection);
        assert_eq!(values.len(), 1);
        assert!(values.contains_key("count"));
        assert_eq!(form.visible_indices(&selection), vec![1]);
    }

    #[test]
    fn toggles_mirror_into_controls() {
        let mut form = ParamForm::from_runs(&sample_runs(), FormMode::ShowAll);
        let mut selection = SelectionState::default();

        let outcome = selection.toggle("count", 1, ParamValue::Int(7));
        form.apply_toggle("count", &outcome);
        assert_eq!(form.field("count").unwrap().value(), &ParamValue::Int(7));

        let outcome = selection.toggle("count", 1, ParamValue::Int(7));
        form.apply_toggle("count", &outcome);
        assert_eq!(form.field("count").unwrap().value(), &ParamValue::Int(0));
    }

    #[test]
    fn int_buffer_editing_commits_valid_states_only() {
        let mut field = ParamField::new("count", ValueKind::Int);
        field.backspace(); // "" does not parse; last valid value kept
        assert_eq!(field.value(), &ParamValue::Int(0));
        assert!(!field.buffer_valid());

        field.insert_char('4');
        field.insert_char('2');
        assert_eq!(field.value(), &ParamValue::Int(42));
        field.insert_char('x'); // rejected by the charset gate
        assert_eq!(field.buffer(), "42");
    }

    #[test]
    fn float_buffer_tolerates_transient_invalid_text() {
        let mut field = ParamField::new("ratio", ValueKind::Float);
        field.backspace();
        field.insert_char('-');
        assert!(!field.buffer_valid());
        assert_eq!(field.value(), &ParamValue::Float(0.0));
        field.insert_char('0');
        field.insert_char('.');
        field.insert_char('5');
        assert_eq!(field.value(), &ParamValue::Float(-0.5));
    }

    #[test]
    fn bool_toggle_and_int_step() {
        let mut flag = ParamField::new("dry_run", ValueKind::Bool);
        flag.toggle();
        assert_eq!(flag.value(), &ParamValue::Bool(true));

        let mut count = ParamField::new("count", ValueKind::Int);
        count.step(1);
        count.step(1);
        count.step(-1);
        assert_eq!(count.value(), &ParamValue::Int(1));
        assert_eq!(count.buffer(), "1");
    }

    #[test]
    fn coercion_policy_for_mismatched_kinds() {
        assert_eq!(
            coerce_to_kind(ValueKind::Float, ParamValue::Int(3)),
            ParamValue::Float(3.0)
        );
        assert_eq!(
            coerce_to_kind(ValueKind::Str, ParamValue::Int(3)),
            ParamValue::Str("3".into())
        );
        assert_eq!(
            coerce_to_kind(ValueKind::Int, ParamValue::Str("oops".into())),
            ParamValue::Int(0)
        );
        assert_eq!(
            coerce_to_kind(ValueKind::Bool, ParamValue::Int(1)),
            ParamValue::Bool(false)
        );
    }
}
