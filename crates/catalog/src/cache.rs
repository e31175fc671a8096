//! TTL memoization for catalog reads.
//!
//! The presentation shell re-renders from scratch on every operator
//! interaction, so within one interactive burst the same catalog reads
//! recur many times. This wrapper answers repeats from memory for a short
//! validity window (tens of seconds); staleness beyond that window is
//! acceptable and expected.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use relaunch_types::Run;
use tokio::sync::Mutex;
use tracing::trace;

use crate::error::CatalogError;
use crate::{BranchIndex, RunCatalog};

struct Entry<T> {
    fetched_at: Instant,
    value: T,
}

impl<T: Clone> Entry<T> {
    fn fresh(&self, ttl: Duration) -> Option<T> {
        (self.fetched_at.elapsed() < ttl).then(|| self.value.clone())
    }
}

type RunsKey = (String, Option<String>, Option<String>);

/// A [`RunCatalog`] that memoizes an inner catalog's answers per
/// (flow, project, branch) key for a fixed TTL. Errors are never cached;
/// the next read retries the inner catalog.
pub struct CachedCatalog<C> {
    inner: C,
    ttl: Duration,
    runs: Mutex<HashMap<RunsKey, Entry<Vec<Run>>>>,
    branches: Mutex<HashMap<String, Entry<BranchIndex>>>,
}

impl<C> CachedCatalog<C> {
    pub fn new(inner: C, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            runs: Mutex::new(HashMap::new()),
            branches: Mutex::new(HashMap::new()),
        }
    }

    /// Drop all memoized answers, forcing the next reads through.
    pub async fn invalidate(&self) {
        self.runs.lock().await.clear();
        self.branches.lock().await.clear();
    }
}

#[async_trait]
impl<C: RunCatalog> RunCatalog for CachedCatalog<C> {
    async fn list_runs(
        &self,
        flow: &str,
        project: Option<&str>,
        branch: Option<&str>,
    ) -> Result<Vec<Run>, CatalogError> {
        let key: RunsKey = (
            flow.to_string(),
            project.map(str::to_string),
            branch.map(str::to_string),
        );
        if let Some(entry) = self.runs.lock().await.get(&key) {
            if let Some(hit) = entry.fresh(self.ttl) {
                trace!(flow, "run list served from cache");
                return Ok(hit);
            }
        }
        let value = self.inner.list_runs(flow, project, branch).await?;
        self.runs.lock().await.insert(
            key,
            Entry {
                fetched_at: Instant::now(),
                value: value.clone(),
            },
        );
        Ok(value)
    }

    async fn list_branches(&self, flow: &str) -> Result<BranchIndex, CatalogError> {
        if let Some(entry) = self.branches.lock().await.get(flow) {
            if let Some(hit) = entry.fresh(self.ttl) {
                trace!(flow, "branch list served from cache");
                return Ok(hit);
            }
        }
        let value = self.inner.list_branches(flow).await?;
        self.branches.lock().await.insert(
            flow.to_string(),
            Entry {
                fetched_at: Instant::now(),
                value: value.clone(),
            },
        );
        Ok(value)
    }
}
