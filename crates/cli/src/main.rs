//! Dashboard entry point: argument parsing, config assembly, adapter
//! wiring, and terminal startup.

use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use relaunch_catalog::{
    ApiClient, CachedCatalog, EventDispatcher, HttpEventDispatcher, HttpRunCatalog, RunCatalog,
};
use relaunch_types::{DashboardConfig, FormMode, Scope};
use tracing::info;

const REGISTRY_BASE_ENV: &str = "RELAUNCH_REGISTRY_BASE";
const EVENTS_BASE_ENV: &str = "RELAUNCH_EVENTS_BASE";
const LOG_FILE_ENV: &str = "RELAUNCH_LOG_FILE";

/// Browse past workflow runs and relaunch them with edited parameters.
#[derive(Debug, Parser)]
#[command(name = "relaunch", version, about)]
struct Cli {
    /// Workflow to open on.
    flow: Option<String>,

    /// Project tag to scope runs by. Implies --project-scoped.
    #[arg(long)]
    project: Option<String>,

    /// Branch to scope runs by, using its display name. Implies
    /// --project-scoped.
    #[arg(long)]
    branch: Option<String>,

    /// A shared scope query string (flow=…&project=…&branch=…), as put on
    /// the status line by Ctrl-y. Overrides the flow argument.
    #[arg(long, value_name = "QUERY")]
    scope: Option<String>,

    /// Deployment preset file (YAML).
    #[arg(long, value_name = "FILE")]
    deployment: Option<String>,

    /// Only show form controls for parameters with a selected cell.
    #[arg(long)]
    selected_only: bool,

    /// Scope runs by project/branch tags and show the selectors.
    #[arg(long)]
    project_scoped: bool,

    /// Fixed relaunch event name; by default the event name is read from
    /// run metadata.
    #[arg(long)]
    event_name: Option<String>,

    /// Run registry base URL.
    #[arg(long, env = REGISTRY_BASE_ENV)]
    registry_base: Option<String>,

    /// Event bus base URL. Defaults to the registry base.
    #[arg(long, env = EVENTS_BASE_ENV)]
    events_base: Option<String>,

    /// Rows per table page.
    #[arg(long)]
    page_size: Option<usize>,

    /// Catalog cache window in seconds.
    #[arg(long)]
    cache_ttl_secs: Option<u64>,
}

impl Cli {
    /// Assemble the dashboard config: deployment preset first, then flag
    /// overrides on top.
    fn into_config(self) -> Result<DashboardConfig> {
        let mut config = match &self.deployment {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("cannot open deployment preset {path}"))?;
                serde_yaml::from_reader(file)
                    .with_context(|| format!("invalid deployment preset {path}"))?
            }
            None => DashboardConfig::default(),
        };

        if let Some(query) = &self.scope {
            config.scope = Scope::from_query(query).context("invalid --scope query")?;
        } else if let Some(flow) = self.flow {
            config.scope.flow = flow;
        }
        if self.project.is_some() {
            config.scope.project = self.project;
        }
        if self.branch.is_some() {
            config.scope.branch = self.branch;
        }
        if self.selected_only {
            config.form_mode = FormMode::SelectedOnly;
        }
        if self.project_scoped
            || self.scope.is_some()
            || config.scope.project.is_some()
            || config.scope.branch.is_some()
        {
            config.project_scoped = true;
        }
        if self.event_name.is_some() {
            config.event_name = self.event_name;
        }
        if self.registry_base.is_some() {
            config.registry_base = self.registry_base;
        }
        if self.events_base.is_some() {
            config.events_base = self.events_base;
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(ttl) = self.cache_ttl_secs {
            config.cache_ttl_secs = ttl;
        }
        Ok(config)
    }
}

/// The TUI owns the terminal, so tracing goes to a file and only when one
/// is asked for.
fn init_tracing() {
    let Ok(path) = std::env::var(LOG_FILE_ENV) else {
        return;
    };
    let Ok(file) = File::options().create(true).append(true).open(&path) else {
        eprintln!("warning: cannot open log file {path}");
        return;
    };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
}

fn build_adapters(
    config: &DashboardConfig,
) -> Result<(Arc<dyn RunCatalog>, Arc<dyn EventDispatcher>)> {
    let registry_base = config
        .registry_base
        .clone()
        .with_context(|| format!("no run registry configured; set {REGISTRY_BASE_ENV}"))?;
    let events_base = config.events_base.clone().unwrap_or_else(|| registry_base.clone());

    let registry = ApiClient::new(&registry_base)?;
    // Without a fixed event name every run must carry one, or it cannot
    // be relaunched.
    let require_event_name = config.event_name.is_none();
    let catalog = CachedCatalog::new(
        HttpRunCatalog::new(registry, require_event_name),
        Duration::from_secs(config.cache_ttl_secs()),
    );

    let events = ApiClient::new(&events_base)?;
    let dispatcher = HttpEventDispatcher::new(events);

    Ok((Arc::new(catalog), Arc::new(dispatcher)))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = Cli::parse().into_config()?;
    let (catalog, dispatcher) = build_adapters(&config)?;
    info!(flow = %config.scope.flow, "starting dashboard");
    relaunch_tui::run(config, catalog, dispatcher).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_argument_sets_the_scope() {
        let cli = Cli::parse_from(["relaunch", "CascadingParameters"]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.scope.flow, "CascadingParameters");
        assert!(!config.project_scoped);
    }

    #[test]
    fn scope_query_overrides_the_flow_argument() {
        let cli = Cli::parse_from([
            "relaunch",
            "Ignored",
            "--scope",
            "flow=Flow&project=vision&branch=main",
        ]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.scope.flow, "Flow");
        assert_eq!(config.scope.project.as_deref(), Some("vision"));
        assert!(config.project_scoped);
    }

    #[test]
    fn selected_only_switches_the_form_mode() {
        let cli = Cli::parse_from(["relaunch", "Flow", "--selected-only"]);
        assert_eq!(cli.into_config().unwrap().form_mode, FormMode::SelectedOnly);
    }

    #[test]
    fn project_flag_implies_the_scoped_variant() {
        let cli = Cli::parse_from(["relaunch", "Flow", "--project", "vision"]);
        let config = cli.into_config().unwrap();
        assert!(config.project_scoped);
        assert_eq!(config.scope.project.as_deref(), Some("vision"));
    }

    #[test]
    fn invalid_scope_query_is_an_error() {
        let cli = Cli::parse_from(["relaunch", "--scope", "project=vision"]);
        assert!(cli.into_config().is_err());
    }

    #[test]
    fn missing_registry_base_is_reported() {
        let config = DashboardConfig::default();
        let err = match build_adapters(&config) {
            Ok(_) => panic!("expected build_adapters to fail"),
            Err(err) => err,
        };
        assert!(err.to_string().contains(REGISTRY_BASE_ENV));
    }
}
