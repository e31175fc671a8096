//! External collaborator adapters for the Relaunch dashboard.
//!
//! The dashboard core consumes two external systems and implements neither:
//! a run registry that lists past executions of a flow, and an event bus
//! that triggers new ones. This crate defines the trait seams the core
//! depends on ([`RunCatalog`], [`EventDispatcher`]), HTTP implementations of
//! both, a TTL-memoizing catalog wrapper so repeated re-renders within one
//! interactive burst do not re-hit the registry, and in-memory doubles for
//! tests and offline demos.

mod cache;
mod error;
mod http;
mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use indexmap::IndexMap;
use relaunch_types::{Branch, ParamValue, Run};

pub use cache::CachedCatalog;
pub use error::{CatalogError, DispatchError};
pub use http::{ApiClient, HttpEventDispatcher, HttpRunCatalog};
pub use memory::{InMemoryCatalog, RecordingDispatcher};

/// Branch listings grouped by project, sorted for stable selector display.
pub type BranchIndex = BTreeMap<String, Vec<Branch>>;

/// Read access to the run registry.
///
/// Implementations return runs in registry-defined order (newest first for
/// the reference registry); callers never re-sort. Runs that did not start,
/// or that lack a relaunch event name when one is required, are filtered out
/// here and never reach the core.
#[async_trait]
pub trait RunCatalog: Send + Sync {
    /// List past runs of `flow`, optionally scoped to a project and an
    /// internal branch name.
    async fn list_runs(
        &self,
        flow: &str,
        project: Option<&str>,
        branch: Option<&str>,
    ) -> Result<Vec<Run>, CatalogError>;

    /// List the branches each project has run `flow` under. Per-user
    /// branches are excluded; internal names are normalized for display.
    async fn list_branches(&self, flow: &str) -> Result<BranchIndex, CatalogError>;
}

/// Write access to the event bus.
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    /// Publish `event_name` with a key-value payload, triggering a new run.
    /// Called exactly once per explicit operator launch action; failures are
    /// surfaced to the operator and never retried automatically.
    async fn publish(
        &self,
        event_name: &str,
        payload: &IndexMap<String, ParamValue>,
    ) -> Result<(), DispatchError>;
}
