//! The Relaunch core: session-scoped selection and form state.
//!
//! Everything in this crate is pure state with well-defined transitions; no
//! I/O, no UI types. One [`SessionState`] object owns what one operator
//! session needs: the view scope, the loaded runs, per-parameter selections,
//! the parameter form controls, and the table page. The presentation shell
//! mutates it through named operations (toggle a cell, edit a control, turn
//! a page) and rebuilds its entire view from it after each one, which keeps
//! the "always consistent, no partial update" guarantee without any UI
//! framework reactivity.

mod form;
mod launch;
mod pager;
mod selection;
mod state;

pub use form::{ParamField, ParamForm, coerce_to_kind};
pub use launch::{LaunchError, LaunchRequest};
pub use pager::Pager;
pub use selection::{Selection, SelectionState, ToggleOutcome};
pub use state::SessionState;
