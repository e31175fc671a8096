//! Terminal user interface for the Relaunch dashboard.
//!
//! Two panes: a paginated table of past runs whose cells can be selected,
//! and a parameter edit form with a single Launch action. A scope bar on top
//! picks which catalog is loaded (flow name, and project/branch selectors in
//! the project-scoped deployment). Every UI element is a component that
//! handles its own key events and renders itself; operator actions fold
//! through [`app::App::update`] and are followed by a full redraw, so the
//! view is always consistent with the session state.

mod app;
mod theme;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use relaunch_catalog::{EventDispatcher, RunCatalog};
use relaunch_types::DashboardConfig;

pub use app::App;

/// Run the dashboard until the operator quits.
///
/// Sets up the terminal (raw mode, alternate screen), drives the event
/// loop, and restores the terminal on the way out. The catalog and
/// dispatcher are the external collaborators; the TUI implements neither.
pub async fn run(
    config: DashboardConfig,
    catalog: Arc<dyn RunCatalog>,
    dispatcher: Arc<dyn EventDispatcher>,
) -> Result<()> {
    ui::runtime::run_app(config, catalog, dispatcher).await
}
