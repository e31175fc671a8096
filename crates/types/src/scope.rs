//! View scope: which flow, project and branch the dashboard is looking at.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::form_urlencoded;

/// A deployment branch with its registry-internal name and the name shown
/// to operators.
///
/// Display normalization follows the registry's conventions: the internal
/// branch `prod` is shown as `main`, a `test.<name>` branch is shown as
/// `<name>`, and per-user `user.<name>` branches are hidden from selectors
/// entirely. Everything else displays as-is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Branch {
    /// Operator-facing name.
    pub display: String,
    /// Name used when querying the registry.
    pub internal: String,
}

impl Branch {
    /// Normalize an internal branch name for display. Returns `None` for
    /// branches that must not be offered in selectors.
    pub fn from_internal(internal: &str) -> Option<Branch> {
        if internal.starts_with("user.") {
            return None;
        }
        let display = if internal == "prod" {
            "main".to_string()
        } else if let Some(rest) = internal.strip_prefix("test.") {
            rest.to_string()
        } else {
            internal.to_string()
        };
        Some(Branch {
            display,
            internal: internal.to_string(),
        })
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// Failure to parse a shared scope query string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeParseError {
    /// The query string has no `flow` key.
    #[error("scope query is missing the flow name")]
    MissingFlow,
}

/// The shareable view state: flow name plus optional project and branch.
///
/// Round-trips through a URL-style query string (`flow=…&project=…&branch=…`)
/// so one operator can hand their exact view to another. The branch is kept
/// by display name; the session resolves it against the loaded branch list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// Workflow name, as typed into the flow field.
    pub flow: String,
    /// Project tag, when the deployment scopes runs by project.
    pub project: Option<String>,
    /// Branch display name, when the deployment scopes runs by branch.
    pub branch: Option<String>,
}

impl Scope {
    pub fn new(flow: impl Into<String>) -> Self {
        Scope {
            flow: flow.into(),
            project: None,
            branch: None,
        }
    }

    /// Serialize to a shareable query string.
    pub fn to_query(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        ser.append_pair("flow", &self.flow);
        if let Some(project) = &self.project {
            ser.append_pair("project", project);
        }
        if let Some(branch) = &self.branch {
            ser.append_pair("branch", branch);
        }
        ser.finish()
    }

    /// Parse a query string produced by [`Scope::to_query`] (or typed by
    /// hand). Unknown keys are ignored; a missing flow is an error.
    pub fn from_query(query: &str) -> Result<Scope, ScopeParseError> {
        let mut scope = Scope::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "flow" => scope.flow = value.into_owned(),
                "project" => scope.project = Some(value.into_owned()),
                "branch" => scope.branch = Some(value.into_owned()),
                _ => {}
            }
        }
        if scope.flow.is_empty() {
            return Err(ScopeParseError::MissingFlow);
        }
        Ok(scope)
    }
}
