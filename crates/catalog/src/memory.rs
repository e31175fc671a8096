//! In-memory adapter doubles for tests and offline demos.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use indexmap::IndexMap;
use relaunch_types::{ParamValue, Run};

use crate::error::{CatalogError, DispatchError};
use crate::{BranchIndex, EventDispatcher, RunCatalog};

/// A [`RunCatalog`] serving fixed data and counting calls.
#[derive(Default)]
pub struct InMemoryCatalog {
    runs: Vec<Run>,
    branches: BranchIndex,
    fail_with: Option<String>,
    run_calls: AtomicUsize,
    branch_calls: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn with_runs(runs: Vec<Run>) -> Self {
        Self {
            runs,
            ..Self::default()
        }
    }

    pub fn with_branches(mut self, branches: BranchIndex) -> Self {
        self.branches = branches;
        self
    }

    /// Make every read fail with a transport error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn run_calls(&self) -> usize {
        self.run_calls.load(Ordering::SeqCst)
    }

    pub fn branch_calls(&self) -> usize {
        self.branch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RunCatalog for InMemoryCatalog {
    async fn list_runs(
        &self,
        _flow: &str,
        _project: Option<&str>,
        _branch: Option<&str>,
    ) -> Result<Vec<Run>, CatalogError> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(CatalogError::Transport(message.clone())),
            None => Ok(self.runs.clone()),
        }
    }

    async fn list_branches(&self, _flow: &str) -> Result<BranchIndex, CatalogError> {
        self.branch_calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(CatalogError::Transport(message.clone())),
            None => Ok(self.branches.clone()),
        }
    }
}

/// An [`EventDispatcher`] that records what it was asked to publish.
#[derive(Default)]
pub struct RecordingDispatcher {
    published: Mutex<Vec<(String, IndexMap<String, ParamValue>)>>,
    reject_with: Option<String>,
}

impl RecordingDispatcher {
    /// Make every publish fail with the given reason.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            reject_with: Some(reason.into()),
        }
    }

    /// Everything published so far, in order.
    pub fn published(&self) -> Vec<(String, IndexMap<String, ParamValue>)> {
        self.published.lock().expect("dispatcher lock").clone()
    }
}

#[async_trait]
impl EventDispatcher for RecordingDispatcher {
    async fn publish(
        &self,
        event_name: &str,
        payload: &IndexMap<String, ParamValue>,
    ) -> Result<(), DispatchError> {
        if let Some(reason) = &self.reject_with {
            return Err(DispatchError::Rejected {
                event: event_name.to_string(),
                status: 503,
                reason: reason.clone(),
            });
        }
        self.published
            .lock()
            .expect("dispatcher lock")
            .push((event_name.to_string(), payload.clone()));
        Ok(())
    }
}
