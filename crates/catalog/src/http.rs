//! HTTP implementations of the registry and event bus adapters.
//!
//! Both external systems are reached through [`ApiClient`], a thin wrapper
//! around a configured `reqwest::Client`:
//!
//! - a validated base URL (https required off localhost)
//! - bearer-token auth discovered from `RELAUNCH_API_TOKEN`
//! - a consistent User-Agent and a 30 second timeout

use std::collections::BTreeMap;
use std::time::Duration;
use std::env;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use relaunch_types::{Branch, ParamValue, Run};
use reqwest::{Client, RequestBuilder, Url, header};
use serde::Deserialize;
use tracing::debug;

use crate::error::{CatalogError, DispatchError};
use crate::{BranchIndex, EventDispatcher, RunCatalog};

/// Environment variable holding the bearer token for both services.
pub const API_TOKEN_ENV: &str = "RELAUNCH_API_TOKEN";

/// Hostnames allowed with any scheme for local development.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Thin wrapper around a configured `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
    user_agent: String,
}

impl ApiClient {
    /// Construct a client for `base_url`, reading the auth token from the
    /// environment. Non-localhost hosts must use https.
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        validate_base_url(base_url)?;

        let mut default_headers = header::HeaderMap::new();
        if let Ok(token) = env::var(API_TOKEN_ENV) {
            let value = format!("Bearer {token}");
            let header_value = header::HeaderValue::from_str(&value)
                .map_err(|_| CatalogError::Config("auth token is not a valid header value".into()))?;
            default_headers.insert(header::AUTHORIZATION, header_value);
        }

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CatalogError::Config(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            user_agent: format!("relaunch/0.1; {}", env::consts::OS),
        })
    }

    /// Build a request for a method and service-relative path.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }
}

/// Validate that a base URL is acceptable: localhost with any scheme, or
/// https anywhere else.
fn validate_base_url(base: &str) -> Result<(), CatalogError> {
    let parsed = Url::parse(base)
        .map_err(|e| CatalogError::Config(format!("invalid base URL '{base}': {e}")))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| CatalogError::Config(format!("base URL '{base}' has no host")))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed.scheme() != "https" {
        return Err(CatalogError::Config(format!(
            "base URL must use https for non-localhost hosts; got '{}://'",
            parsed.scheme()
        )));
    }
    Ok(())
}

/// A run as the registry serializes it.
#[derive(Debug, Deserialize)]
struct RunRecord {
    run_id: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    event_name: Option<String>,
    #[serde(default)]
    started: bool,
    #[serde(default)]
    parameters: IndexMap<String, ParamValue>,
}

/// Convert wire records into domain runs, dropping those the core must
/// never see: runs that did not start, and (when relaunch events are
/// sourced from run metadata) runs without an event name. Registry order is
/// preserved.
fn runs_from_records(records: Vec<RunRecord>, require_event_name: bool) -> Vec<Run> {
    records
        .into_iter()
        .filter(|r| r.started && (!require_event_name || r.event_name.is_some()))
        .map(|r| Run {
            id: r.run_id,
            created_at: r.created_at,
            event_name: r.event_name,
            parameters: r.parameters,
        })
        .collect()
}

/// Group wire branch listings by project, normalizing internal names for
/// display and dropping per-user branches.
fn branches_from_wire(wire: BTreeMap<String, Vec<String>>) -> BranchIndex {
    wire.into_iter()
        .filter_map(|(project, internals)| {
            let mut branches: Vec<Branch> = internals
                .iter()
                .filter_map(|internal| Branch::from_internal(internal))
                .collect();
            branches.sort();
            branches.dedup();
            if branches.is_empty() {
                None
            } else {
                Some((project, branches))
            }
        })
        .collect()
}

/// [`RunCatalog`] backed by the run registry's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpRunCatalog {
    client: ApiClient,
    /// Whether runs without an event name are useless to this deployment
    /// (event names sourced from run metadata rather than static config).
    require_event_name: bool,
}

impl HttpRunCatalog {
    pub fn new(client: ApiClient, require_event_name: bool) -> Self {
        Self {
            client,
            require_event_name,
        }
    }
}

#[async_trait]
impl RunCatalog for HttpRunCatalog {
    async fn list_runs(
        &self,
        flow: &str,
        project: Option<&str>,
        branch: Option<&str>,
    ) -> Result<Vec<Run>, CatalogError> {
        let mut request = self
            .client
            .request(reqwest::Method::GET, &format!("/flows/{flow}/runs"));
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(project) = project {
            query.push(("project", project));
        }
        if let Some(branch) = branch {
            query.push(("branch", branch));
        }
        if !query.is_empty() {
            request = request.query(&query);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message,
            });
        }
        let records: Vec<RunRecord> = response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;
        let runs = runs_from_records(records, self.require_event_name);
        debug!(flow, count = runs.len(), "listed runs");
        Ok(runs)
    }

    async fn list_branches(&self, flow: &str) -> Result<BranchIndex, CatalogError> {
        let response = self
            .client
            .request(reqwest::Method::GET, &format!("/flows/{flow}/branches"))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message,
            });
        }
        let wire: BTreeMap<String, Vec<String>> = response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;
        Ok(branches_from_wire(wire))
    }
}

/// [`EventDispatcher`] backed by the event bus webhook API.
#[derive(Debug, Clone)]
pub struct HttpEventDispatcher {
    client: ApiClient,
}

impl HttpEventDispatcher {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventDispatcher for HttpEventDispatcher {
    async fn publish(
        &self,
        event_name: &str,
        payload: &IndexMap<String, ParamValue>,
    ) -> Result<(), DispatchError> {
        debug!(event_name, params = payload.len(), "publishing event");
        let response = self
            .client
            .request(reqwest::Method::POST, &format!("/events/{event_name}"))
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                event: event_name.to_string(),
                status: status.as_u16(),
                reason,
            });
        }
        Ok(())
    }
}
