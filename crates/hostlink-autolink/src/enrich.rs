//! Enrichment coordinator: resolves every referenced id in a text
//! against the hosting service, bounded by a shared deadline.
//!
//! One resolution task is launched per unique id. Tasks run to
//! completion regardless of the deadline (useful for any downstream
//! caching); the aggregator only waits up to the deadline and marks
//! stragglers with a cancellation outcome, their late results discarded.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use hostlink_core::domain::{EnrichmentOutcome, IssueOrPullRequestResult, Result};
use hostlink_core::RemoteProvider;

use crate::engine::AutolinkEngine;

/// A rich hosting integration able to fetch live issue/PR metadata.
///
/// Authentication is the implementation's concern; hostlink never
/// handles credentials itself.
#[async_trait]
pub trait HostingClient: Send + Sync {
    /// Whether a rich integration is connected at all. When false, the
    /// coordinator skips enrichment entirely.
    fn is_connected(&self) -> bool;

    /// Fetch metadata for one issue/PR id in the given repository.
    /// `Ok(None)` means the service answered "no such id".
    async fn get_issue_or_pull_request(
        &self,
        owner: &str,
        repo: &str,
        id: &str,
    ) -> Result<Option<IssueOrPullRequestResult>>;
}

/// One referenced id awaiting resolution, with its repository scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ReferencedId {
    /// Enrichment-map key: the bare id for same-repo references,
    /// `owner/repo#id` for cross-repo ones.
    key: String,
    owner: String,
    repo: String,
    id: String,
}

/// Coordinates per-id resolution fetches under a time budget.
pub struct EnrichmentCoordinator {
    client: Arc<dyn HostingClient>,
}

impl EnrichmentCoordinator {
    pub fn new(client: Arc<dyn HostingClient>) -> Self {
        Self { client }
    }

    /// Resolve every id referenced in `text` for the given remote.
    ///
    /// Returns `None` when the remote has no connected rich integration,
    /// when the text references nothing, or when every id resolved to
    /// not-found (callers then skip enrichment). With a deadline, ids
    /// still outstanding when it expires carry
    /// [`EnrichmentOutcome::TimedOut`]; a missing or zero timeout waits
    /// for all.
    pub async fn resolve_referenced_ids(
        &self,
        text: &str,
        provider: &RemoteProvider,
        engine: &AutolinkEngine,
        timeout: Option<Duration>,
    ) -> Option<HashMap<String, EnrichmentOutcome>> {
        if !self.client.is_connected() {
            return None;
        }

        let refs = collect_referenced_ids(text, provider, engine);
        if refs.is_empty() {
            return None;
        }
        debug!(count = refs.len(), "resolving referenced ids");

        let results: Arc<Mutex<HashMap<String, EnrichmentOutcome>>> =
            Arc::new(Mutex::new(HashMap::new()));

        let mut handles = Vec::with_capacity(refs.len());
        for reference in &refs {
            let client = Arc::clone(&self.client);
            let results = Arc::clone(&results);
            let reference = reference.clone();
            handles.push(tokio::spawn(async move {
                let outcome = match client
                    .get_issue_or_pull_request(&reference.owner, &reference.repo, &reference.id)
                    .await
                {
                    Ok(Some(issue)) => EnrichmentOutcome::Resolved(issue),
                    Ok(None) => EnrichmentOutcome::NotFound,
                    Err(e) => {
                        // Network/auth failures degrade to not-found.
                        warn!(id = %reference.key, error = %e, "reference resolution failed");
                        EnrichmentOutcome::NotFound
                    }
                };
                results.lock().unwrap().insert(reference.key, outcome);
            }));
        }

        match timeout {
            Some(deadline) if !deadline.is_zero() => {
                // Dropping the join handles on timeout does not abort
                // the tasks; they finish in the background and their
                // late results are never read.
                let _ = tokio::time::timeout(deadline, join_all(handles)).await;
            }
            _ => {
                join_all(handles).await;
            }
        }

        let mut outcomes = results.lock().unwrap().clone();
        for reference in &refs {
            outcomes
                .entry(reference.key.clone())
                .or_insert(EnrichmentOutcome::TimedOut);
        }

        if outcomes
            .values()
            .all(|o| matches!(o, EnrichmentOutcome::NotFound))
        {
            return None;
        }
        Some(outcomes)
    }
}

/// Collect every id referenced in `text`, deduplicated: an id matched
/// by two templates resolves once.
fn collect_referenced_ids(
    text: &str,
    provider: &RemoteProvider,
    engine: &AutolinkEngine,
) -> Vec<ReferencedId> {
    let mut seen = HashSet::new();
    let mut refs = Vec::new();

    let Some((owner, repo)) = provider.owner_and_repo() else {
        return refs;
    };

    let providers = [provider.clone()];
    for template in engine.templates(&providers) {
        let Some(compiled) = engine.cache().get_or_compile(&template) else {
            continue;
        };
        for caps in compiled.pattern(false).captures_iter(text) {
            let id = caps[3].to_string();
            if seen.insert(id.clone()) {
                refs.push(ReferencedId {
                    key: id.clone(),
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    id,
                });
            }
        }
    }

    if provider.supports_cross_repo_references() {
        for m in engine.cross_repo().find(text, false) {
            let key = m.reference.key();
            if seen.insert(key.clone()) {
                refs.push(ReferencedId {
                    key,
                    owner: m.reference.owner,
                    repo: m.reference.repo,
                    id: m.reference.id,
                });
            }
        }
    }

    refs
}
