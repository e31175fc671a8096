//! Per-parameter selection of historical values.

use indexmap::IndexMap;
use relaunch_types::ParamValue;

/// One chosen table cell: which row supplied the value, and the value.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Absolute row index into the loaded run list.
    pub row: usize,
    /// The historical value recorded in that cell.
    pub value: ParamValue,
}

/// What a toggle did, so the form can mirror it in its controls.
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    /// A selection was set or replaced; the form control takes this value.
    Selected(ParamValue),
    /// The existing selection was cleared; the form control resets to its
    /// type default.
    Deselected,
}

/// Mutable mapping of parameter name to its single active selection.
///
/// Invariant: at most one selection per parameter. Toggling the same
/// (parameter, row) pair removes the entry; toggling a different row for the
/// same parameter replaces it. Entries for other parameters are never
/// touched. Owned by the interactive session; discarded with it.
#[derive(Debug, Default)]
pub struct SelectionState {
    entries: IndexMap<String, Selection>,
}

impl SelectionState {
    /// Select or deselect a cell for `param`.
    pub fn toggle(&mut self, param: &str, row: usize, value: ParamValue) -> ToggleOutcome {
        if self.entries.get(param).is_some_and(|s| s.row == row) {
            self.entries.shift_remove(param);
            ToggleOutcome::Deselected
        } else {
            self.entries
                .insert(param.to_string(), Selection { row, value: value.clone() });
            ToggleOutcome::Selected(value)
        }
    }

    pub fn get(&self, param: &str) -> Option<&Selection> {
        self.entries.get(param)
    }

    /// Whether `param` currently points at `row` (cell highlight).
    pub fn is_selected(&self, param: &str, row: usize) -> bool {
        self.entries.get(param).is_some_and(|s| s.row == row)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_the_same_cell_twice_is_an_idempotent_pair() {
        let mut state = SelectionState::default();
        assert_eq!(
            state.toggle("count", 2, ParamValue::Int(7)),
            ToggleOutcome::Selected(ParamValue::Int(7))
        );
        assert!(state.is_selected("count", 2));

        assert_eq!(
            state.toggle("count", 2, ParamValue::Int(7)),
            ToggleOutcome::Deselected
        );
        assert!(state.get("count").is_none());
        assert!(state.is_empty());
    }

    #[test]
    fn selecting_a_second_row_replaces_the_first() {
        let mut state = SelectionState::default();
        state.toggle("count", 0, ParamValue::Int(5));
        state.toggle("count", 1, ParamValue::Int(7));

        let selection = state.get("count").unwrap();
        assert_eq!(selection.row, 1);
        assert_eq!(selection.value, ParamValue::Int(7));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn parameters_are_independent() {
        let mut state = SelectionState::default();
        state.toggle("count", 0, ParamValue::Int(5));
        state.toggle("ratio", 2, ParamValue::Float(0.9));

        state.toggle("count", 0, ParamValue::Int(5)); // deselect count
        assert!(state.get("count").is_none());
        assert_eq!(state.get("ratio").unwrap().value, ParamValue::Float(0.9));
    }
}
