//! Shared type definitions for the Relaunch dashboard.
//!
//! This leaf crate holds the domain vocabulary used by every other crate in
//! the workspace: parameter values and their inferred kinds, historical runs,
//! branch display normalization, the shareable view scope, and the static
//! dashboard configuration. It deliberately contains no I/O and no UI types.

mod config;
mod run;
mod scope;
mod value;

pub use config::{DashboardConfig, EventSource, FormMode};
pub use run::Run;
pub use scope::{Branch, Scope, ScopeParseError};
pub use value::{ParamValue, ValueKind};
