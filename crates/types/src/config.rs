//! Static dashboard configuration.
//!
//! A deployment of the dashboard is one configuration of the same core:
//! which flow it opens on, whether the form shows every known parameter or
//! only selected ones, and where relaunch event names come from. Presets are
//! plain serde structs so a deployment can live in a YAML file.

use serde::{Deserialize, Serialize};

use crate::Scope;

/// Which parameters the edit form renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormMode {
    /// Every parameter known to the catalog always has a control.
    #[default]
    ShowAll,
    /// Only parameters with an active selection get a control; launching
    /// with no selections is a validation error.
    SelectedOnly,
}

/// Where the relaunch event name comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    /// Read from the first catalog run's recorded metadata.
    FromRun,
    /// Fixed by deployment configuration.
    Static(String),
}

/// Static configuration for one dashboard deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Initial view scope (flow, project, branch).
    pub scope: Scope,
    /// Parameter form variant.
    pub form_mode: FormMode,
    /// Whether runs are scoped by project/branch tags. When false the
    /// dashboard reads the registry's ambient namespace and shows no
    /// project or branch selectors.
    pub project_scoped: bool,
    /// Fixed relaunch event name; when absent the event name is read from
    /// run metadata.
    pub event_name: Option<String>,
    /// Run registry base URL override.
    pub registry_base: Option<String>,
    /// Event bus base URL override.
    pub events_base: Option<String>,
    /// Rows per table page.
    pub page_size: usize,
    /// Catalog memoization window, in seconds.
    pub cache_ttl_secs: u64,
}

impl DashboardConfig {
    pub const DEFAULT_PAGE_SIZE: usize = 10;
    pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

    /// Resolve the configured event source.
    pub fn event_source(&self) -> EventSource {
        match &self.event_name {
            Some(name) => EventSource::Static(name.clone()),
            None => EventSource::FromRun,
        }
    }

    /// Rows per page, falling back to the default when unset.
    pub fn page_size(&self) -> usize {
        if self.page_size == 0 {
            Self::DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        }
    }

    /// Catalog cache window, falling back to the default when unset.
    pub fn cache_ttl_secs(&self) -> u64 {
        if self.cache_ttl_secs == 0 {
            Self::DEFAULT_CACHE_TTL_SECS
        } else {
            self.cache_ttl_secs
        }
    }
}
