//! Launch-request assembly and validation.

use indexmap::IndexMap;
use relaunch_types::ParamValue;
use thiserror::Error;

/// Everything the dispatcher needs for one relaunch.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRequest {
    pub event_name: String,
    pub payload: IndexMap<String, ParamValue>,
}

impl LaunchRequest {
    /// Short human summary for the status line.
    pub fn summary(&self) -> String {
        let params: Vec<String> = self
            .payload
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        format!("{} {{{}}}", self.event_name, params.join(", "))
    }
}

/// Why a launch was refused before the dispatcher was ever invoked.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LaunchError {
    /// Selected-only form with nothing selected.
    #[error("select at least one parameter before launching")]
    NothingSelected,
    /// Event names are sourced from run metadata, but no run supplied one.
    #[error("no relaunch event name is recorded for this flow")]
    MissingEventName,
    /// The catalog has not produced any runs to relaunch from.
    #[error("no runs loaded; nothing to relaunch")]
    NoRunsLoaded,
}
