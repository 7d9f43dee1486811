//! Issue/pull-request metadata and enrichment outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of an issue or pull request on the hosting service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
    Merged,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            IssueState::Merged => "merged",
        }
    }
}

/// Live metadata for a referenced issue or pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssueOrPullRequestResult {
    /// The referenced id, as matched in text (e.g. `"42"`).
    pub id: String,

    /// Issue/PR title.
    pub title: String,

    /// Current state.
    pub state: IssueState,

    /// When the issue/PR was created.
    pub created_at: DateTime<Utc>,

    /// When it was closed or merged, if it was.
    pub closed_at: Option<DateTime<Utc>>,

    /// Canonical web URL.
    pub url: String,

    /// Whether the id refers to a pull request rather than an issue.
    pub is_pull_request: bool,
}

/// Outcome of resolving one referenced id against the hosting service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EnrichmentOutcome {
    /// The hosting service returned metadata before the deadline.
    Resolved(IssueOrPullRequestResult),

    /// The hosting service answered: no such issue/PR (or the request
    /// failed; failures degrade to not-found for rendering).
    NotFound,

    /// The request did not complete before the deadline. Its late result
    /// is discarded by the caller.
    TimedOut,
}

impl EnrichmentOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, EnrichmentOutcome::Resolved(_))
    }
}
