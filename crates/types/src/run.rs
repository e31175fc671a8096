//! Historical workflow runs as surfaced by the run registry.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ParamValue;

/// One past execution of a workflow, immutable once loaded.
///
/// Parameter names are stable across all runs of one logical flow grouping,
/// which is what lets the edit form be rendered once, keyed by name, from
/// the first run alone. Runs that never started or (when relaunch events are
/// sourced from run metadata) carry no event name are filtered out by the
/// catalog adapter and never reach this type's consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Registry-assigned run identifier.
    pub id: String,
    /// When the run was created.
    pub created_at: DateTime<Utc>,
    /// Event that triggered this run, reused for relaunch when the
    /// deployment sources event names from run metadata.
    pub event_name: Option<String>,
    /// Parameter name to recorded value, in registry column order.
    pub parameters: IndexMap<String, ParamValue>,
}

impl Run {
    /// Table label combining the id with a second-resolution timestamp.
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.id, self.created_at.format("%Y-%m-%d %H:%M:%S"))
    }

    /// Parameter names in registry order. Only meaningful on the first run
    /// of a catalog, which defines the known-parameter set.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_label_trims_subsecond_noise() {
        let run = Run {
            id: "1764".into(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
            event_name: Some("launch_experiment".into()),
            parameters: IndexMap::new(),
        };
        assert_eq!(run.display_label(), "1764 (2026-03-14 09:26:53)");
    }

    #[test]
    fn parameter_names_preserve_registry_order() {
        let mut parameters = IndexMap::new();
        parameters.insert("animal1".to_string(), ParamValue::Str("cat".into()));
        parameters.insert("count".to_string(), ParamValue::Int(5));
        parameters.insert("ratio".to_string(), ParamValue::Float(0.1));
        let run = Run {
            id: "1".into(),
            created_at: Utc::now(),
            event_name: None,
            parameters,
        };
        let names: Vec<&str> = run.parameter_names().collect();
        assert_eq!(names, ["animal1", "count", "ratio"]);
    }
}
