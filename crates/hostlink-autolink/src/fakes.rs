//! In-memory test doubles for the enrichment path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use hostlink_core::domain::{IssueOrPullRequestResult, Result};

use crate::enrich::HostingClient;

/// In-memory [`HostingClient`] with per-issue response delays, keyed by
/// `owner/repo#id`.
pub struct MemoryHostingClient {
    issues: Mutex<HashMap<String, IssueOrPullRequestResult>>,
    delays: Mutex<HashMap<String, Duration>>,
    queries: AtomicUsize,
    connected: bool,
}

impl Default for MemoryHostingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHostingClient {
    pub fn new() -> Self {
        Self {
            issues: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            queries: AtomicUsize::new(0),
            connected: true,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ..Self::new()
        }
    }

    /// Register an issue under `owner/repo#id`.
    pub fn insert(&self, key: impl Into<String>, issue: IssueOrPullRequestResult) {
        self.issues.lock().unwrap().insert(key.into(), issue);
    }

    /// Delay responses for one key, for deadline tests.
    pub fn delay(&self, key: impl Into<String>, delay: Duration) {
        self.delays.lock().unwrap().insert(key.into(), delay);
    }

    /// Number of fetches issued so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostingClient for MemoryHostingClient {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn get_issue_or_pull_request(
        &self,
        owner: &str,
        repo: &str,
        id: &str,
    ) -> Result<Option<IssueOrPullRequestResult>> {
        let key = format!("{owner}/{repo}#{id}");
        self.queries.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().unwrap().get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.issues.lock().unwrap().get(&key).cloned())
    }
}
