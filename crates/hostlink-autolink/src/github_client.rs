//! GitHub REST implementation of [`HostingClient`].
//!
//! Uses the issues endpoint, which covers pull requests too: a PR
//! response carries a `pull_request` object, a plain issue does not.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use hostlink_core::domain::{
    HostlinkError, IssueOrPullRequestResult, IssueState, Result,
};

use crate::enrich::HostingClient;

const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Hosting client backed by the GitHub (or GitHub Enterprise) REST API.
pub struct GitHubHostingClient {
    http_client: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubHostingClient {
    pub fn new() -> Result<Self> {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// Point the client at a GitHub Enterprise API root
    /// (e.g. `https://github.example.com/api/v3`).
    pub fn with_api_base(api_base: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("hostlink/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HostlinkError::Configuration(format!("http client: {e}")))?;
        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set a bearer token for private repositories and higher rate limits.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    title: String,
    state: String,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    html_url: String,
    pull_request: Option<PullRequestMarker>,
}

#[derive(Debug, Deserialize)]
struct PullRequestMarker {
    merged_at: Option<DateTime<Utc>>,
}

#[async_trait]
impl HostingClient for GitHubHostingClient {
    fn is_connected(&self) -> bool {
        true
    }

    async fn get_issue_or_pull_request(
        &self,
        owner: &str,
        repo: &str,
        id: &str,
    ) -> Result<Option<IssueOrPullRequestResult>> {
        let url = format!("{}/repos/{owner}/{repo}/issues/{id}", self.api_base);
        debug!(%url, "fetching issue metadata");

        let mut request = self
            .http_client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HostlinkError::Resolution(format!("request to {url} failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(HostlinkError::Resolution(format!(
                "{url} returned {}",
                response.status()
            )));
        }

        let issue: IssueResponse = response
            .json()
            .await
            .map_err(|e| HostlinkError::Resolution(format!("decoding {url}: {e}")))?;

        let state = match &issue.pull_request {
            Some(marker) if marker.merged_at.is_some() => IssueState::Merged,
            _ if issue.state == "closed" => IssueState::Closed,
            _ => IssueState::Open,
        };

        Ok(Some(IssueOrPullRequestResult {
            id: id.to_string(),
            title: issue.title,
            state,
            created_at: issue.created_at,
            closed_at: issue.closed_at,
            url: issue.html_url,
            is_pull_request: issue.pull_request.is_some(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_trailing_slash_stripped() {
        let client = GitHubHostingClient::with_api_base("https://github.example.com/api/v3/")
            .unwrap();
        assert_eq!(client.api_base, "https://github.example.com/api/v3");
    }

    #[test]
    fn test_issue_response_state_mapping() {
        let json = r#"{
            "title": "Fix it",
            "state": "closed",
            "created_at": "2024-01-01T00:00:00Z",
            "closed_at": "2024-01-02T00:00:00Z",
            "html_url": "https://github.com/o/r/pull/5",
            "pull_request": { "merged_at": "2024-01-02T00:00:00Z" }
        }"#;
        let issue: IssueResponse = serde_json::from_str(json).unwrap();
        assert!(issue.pull_request.is_some());
        assert_eq!(issue.state, "closed");
    }
}
