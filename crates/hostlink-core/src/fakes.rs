//! In-memory fakes for core traits (testing only).

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::Result;
use crate::reverse::LocalBranchLookup;

/// In-memory branch lookup backed by a fixed set of short branch names.
///
/// Counts queries so tests can assert the lookup is batched.
#[derive(Debug, Default)]
pub struct MemoryBranchLookup {
    branches: Vec<String>,
    queries: AtomicUsize,
}

impl MemoryBranchLookup {
    pub fn new(branches: &[&str]) -> Self {
        Self {
            branches: branches.iter().map(|b| b.to_string()).collect(),
            queries: AtomicUsize::new(0),
        }
    }

    /// Number of batched lookups issued so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocalBranchLookup for MemoryBranchLookup {
    async fn branches_matching(&self, candidates: &[String]) -> Result<Vec<String>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .branches
            .iter()
            .filter(|b| candidates.iter().any(|c| c == *b))
            .cloned()
            .collect())
    }
}
