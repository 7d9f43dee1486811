//! Remote host providers: a closed set of hosting-service variants behind
//! one capability interface.
//!
//! Each variant knows how to build canonical web URLs from abstract
//! [`RemoteResource`] requests and how to reverse-map a pasted hosting URL
//! back to a local file plus line range. Variants are composed from shared
//! configuration fields on [`RemoteProvider`]; there is no inheritance and
//! no open plugin surface.

mod azure;
mod bitbucket;
mod custom;
mod gitea;
mod github;
mod gitlab;
mod google_source;

pub use custom::CustomUrls;

use serde::{Deserialize, Serialize};

use crate::domain::{AutolinkTemplate, RemoteDescriptor, RemoteResource, Result};
use crate::reverse::{
    resolve_revision_and_path, strip_repo_base, LocalBranchLookup, LocalFileInfo, PathParse,
};

/// The closed set of hosting-service variants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    #[serde(rename = "github")]
    GitHub,
    #[serde(rename = "github-enterprise")]
    GitHubEnterprise,
    #[serde(rename = "gitlab")]
    GitLab,
    #[serde(rename = "gitlab-self-hosted")]
    GitLabSelfHosted,
    #[serde(rename = "bitbucket")]
    BitbucketCloud,
    #[serde(rename = "bitbucket-server")]
    BitbucketServer,
    #[serde(rename = "gitea")]
    Gitea,
    #[serde(rename = "google-source")]
    GoogleSource,
    #[serde(rename = "azure-devops")]
    AzureDevOps,
    #[serde(rename = "custom")]
    Custom,
}

impl ProviderKind {
    /// Stable identifier for logging and connected-integration tracking.
    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::GitHub => "github",
            ProviderKind::GitHubEnterprise => "github-enterprise",
            ProviderKind::GitLab => "gitlab",
            ProviderKind::GitLabSelfHosted => "gitlab-self-hosted",
            ProviderKind::BitbucketCloud => "bitbucket",
            ProviderKind::BitbucketServer => "bitbucket-server",
            ProviderKind::Gitea => "gitea",
            ProviderKind::GoogleSource => "google-source",
            ProviderKind::AzureDevOps => "azure-devops",
            ProviderKind::Custom => "custom",
        }
    }

    fn default_display_name(&self) -> &'static str {
        match self {
            ProviderKind::GitHub => "GitHub",
            ProviderKind::GitHubEnterprise => "GitHub Enterprise",
            ProviderKind::GitLab => "GitLab",
            ProviderKind::GitLabSelfHosted => "GitLab Self-Hosted",
            ProviderKind::BitbucketCloud => "Bitbucket",
            ProviderKind::BitbucketServer => "Bitbucket Server",
            ProviderKind::Gitea => "Gitea",
            ProviderKind::GoogleSource => "Google Source",
            ProviderKind::AzureDevOps => "Azure DevOps",
            ProviderKind::Custom => "Custom",
        }
    }

    /// Icon slug for UI consumers.
    pub fn icon(&self) -> &'static str {
        match self {
            ProviderKind::GitHub | ProviderKind::GitHubEnterprise => "github",
            ProviderKind::GitLab | ProviderKind::GitLabSelfHosted => "gitlab",
            ProviderKind::BitbucketCloud | ProviderKind::BitbucketServer => "bitbucket",
            ProviderKind::Gitea => "gitea",
            ProviderKind::GoogleSource => "google-source",
            ProviderKind::AzureDevOps => "azure-devops",
            ProviderKind::Custom => "git",
        }
    }
}

/// A hosting provider bound to one remote.
///
/// Immutable after construction. URL building is pure; reverse mapping
/// performs at most one batched branch lookup.
#[derive(Debug, Clone)]
pub struct RemoteProvider {
    kind: ProviderKind,
    descriptor: RemoteDescriptor,
    custom_urls: Option<CustomUrls>,
}

impl RemoteProvider {
    pub fn new(kind: ProviderKind, descriptor: RemoteDescriptor) -> Self {
        Self {
            kind,
            descriptor,
            custom_urls: None,
        }
    }

    /// Construct a user-defined provider with explicit URL templates.
    pub fn custom(descriptor: RemoteDescriptor, urls: CustomUrls) -> Self {
        Self {
            kind: ProviderKind::Custom,
            descriptor,
            custom_urls: Some(urls),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    pub fn descriptor(&self) -> &RemoteDescriptor {
        &self.descriptor
    }

    pub fn display_name(&self) -> String {
        self.descriptor
            .display_name_override
            .clone()
            .unwrap_or_else(|| self.kind.default_display_name().to_string())
    }

    pub fn icon(&self) -> &'static str {
        self.kind.icon()
    }

    /// Repository path as used in web URLs.
    ///
    /// Bitbucket Server remotes are cloned via `scm/PROJ/repo` but browsed
    /// via `projects/PROJ/repos/repo`.
    pub fn web_path(&self) -> String {
        match self.kind {
            ProviderKind::BitbucketServer => bitbucket::server_web_path(&self.descriptor.path),
            _ => self.descriptor.path.clone(),
        }
    }

    /// Base web URL of the repository.
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}/{}",
            self.descriptor.protocol.web_scheme(),
            self.descriptor.domain,
            self.web_path()
        )
    }

    /// Build the canonical web URL for a resource, if the service has an
    /// equivalent. Comparison and create-pull-request are optional
    /// capabilities; variants without them return `None`.
    pub fn build_url(&self, resource: &RemoteResource) -> Option<String> {
        let base = self.base_url();
        match self.kind {
            ProviderKind::GitHub | ProviderKind::GitHubEnterprise => {
                github::url_for(&base, resource)
            }
            ProviderKind::GitLab | ProviderKind::GitLabSelfHosted => {
                gitlab::url_for(&base, resource)
            }
            ProviderKind::BitbucketCloud => bitbucket::cloud_url_for(&base, resource),
            ProviderKind::BitbucketServer => bitbucket::server_url_for(&base, resource),
            ProviderKind::Gitea => gitea::url_for(&base, resource),
            ProviderKind::GoogleSource => google_source::url_for(&base, resource),
            ProviderKind::AzureDevOps => azure::url_for(&base, resource),
            ProviderKind::Custom => {
                custom::url_for(self.custom_urls.as_ref()?, &base, resource)
            }
        }
    }

    /// Reverse-map a pasted hosting URL to a local file plus line range.
    ///
    /// Returns `None` when the URL does not belong to this remote or does
    /// not point at a file. Performs at most one batched branch lookup.
    pub async fn parse_local_info(
        &self,
        url: &str,
        branches: &dyn LocalBranchLookup,
    ) -> Result<Option<LocalFileInfo>> {
        let Some(rest) = strip_repo_base(url, &self.descriptor.domain, &self.web_path()) else {
            return Ok(None);
        };

        let parsed = match self.kind {
            ProviderKind::GitHub | ProviderKind::GitHubEnterprise => github::parse(rest),
            ProviderKind::GitLab | ProviderKind::GitLabSelfHosted => gitlab::parse(rest),
            ProviderKind::BitbucketCloud => bitbucket::cloud_parse(rest),
            ProviderKind::BitbucketServer => bitbucket::server_parse(rest),
            ProviderKind::Gitea => gitea::parse(rest),
            ProviderKind::GoogleSource => google_source::parse(rest),
            ProviderKind::AzureDevOps => azure::parse(rest),
            ProviderKind::Custom => None,
        };

        match parsed {
            Some(PathParse::Resolved(info)) => Ok(Some(info)),
            Some(PathParse::NeedsDisambiguation {
                joined,
                start_line,
                end_line,
            }) => resolve_revision_and_path(&joined, start_line, end_line, branches).await,
            None => Ok(None),
        }
    }

    /// Autolink templates this provider contributes for its remote.
    pub fn autolink_templates(&self) -> Vec<AutolinkTemplate> {
        let base = self.base_url();
        let name = self.display_name();
        match self.kind {
            ProviderKind::GitHub | ProviderKind::GitHubEnterprise => {
                github::autolink_templates(&base, &name)
            }
            ProviderKind::GitLab | ProviderKind::GitLabSelfHosted => {
                gitlab::autolink_templates(&base, &name)
            }
            ProviderKind::BitbucketCloud => bitbucket::cloud_autolink_templates(&base, &name),
            ProviderKind::BitbucketServer => bitbucket::server_autolink_templates(&base, &name),
            ProviderKind::Gitea => gitea::autolink_templates(&base, &name),
            ProviderKind::AzureDevOps => azure::autolink_templates(&self.descriptor, &name),
            ProviderKind::GoogleSource | ProviderKind::Custom => Vec::new(),
        }
    }

    /// Whether this provider understands `owner/repo#123` cross-repo
    /// references on its host.
    pub fn supports_cross_repo_references(&self) -> bool {
        matches!(
            self.kind,
            ProviderKind::GitHub | ProviderKind::GitHubEnterprise
        )
    }

    /// Issue URL for a cross-repo reference on this provider's host.
    pub fn cross_repo_issue_url(&self, owner: &str, repo: &str, id: &str) -> String {
        format!(
            "{}://{}/{}/{}/issues/{}",
            self.descriptor.protocol.web_scheme(),
            self.descriptor.domain,
            owner,
            repo,
            id
        )
    }

    /// Owner and repository name, when the path has the common
    /// `owner/repo` shape.
    pub fn owner_and_repo(&self) -> Option<(&str, &str)> {
        match self.kind {
            ProviderKind::AzureDevOps => {
                let repo = self.descriptor.path.rsplit('/').next()?;
                let owner = self.descriptor.path.split('/').next()?;
                Some((owner, repo))
            }
            _ => self.descriptor.path.split_once('/'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineRange;

    fn provider(kind: ProviderKind, domain: &str, path: &str) -> RemoteProvider {
        RemoteProvider::new(kind, RemoteDescriptor::new(domain, path))
    }

    #[test]
    fn test_bitbucket_server_base_url_normalizes_scm_path() {
        let p = provider(
            ProviderKind::BitbucketServer,
            "bitbucket.example.com",
            "scm/PROJ/repo",
        );
        assert_eq!(
            p.base_url(),
            "https://bitbucket.example.com/projects/PROJ/repos/repo"
        );
    }

    #[test]
    fn test_display_name_override_wins() {
        let mut d = RemoteDescriptor::new("github.example.com", "owner/repo");
        d.display_name_override = Some("Corp Git".to_string());
        let p = RemoteProvider::new(ProviderKind::GitHubEnterprise, d);
        assert_eq!(p.display_name(), "Corp Git");
    }

    #[test]
    fn test_gerrit_has_no_comparison_capability() {
        let p = provider(ProviderKind::GoogleSource, "gerrithub.io", "proj/repo");
        let url = p.build_url(&RemoteResource::Comparison {
            base: "main".to_string(),
            compare: "dev".to_string(),
            notation: crate::domain::ComparisonNotation::TripleDot,
        });
        assert!(url.is_none());
    }

    #[test]
    fn test_github_file_url_with_range() {
        let p = provider(ProviderKind::GitHub, "github.com", "owner/repo");
        let url = p.build_url(&RemoteResource::Revision {
            path: "src/app.ts".to_string(),
            sha: Some("0123456789abcdef0123456789abcdef01234567".to_string()),
            branch_or_tag: None,
            range: Some(LineRange::span(10, 20)),
        });
        assert_eq!(
            url.unwrap(),
            "https://github.com/owner/repo/blob/0123456789abcdef0123456789abcdef01234567/src/app.ts#L10-L20"
        );
    }

    #[test]
    fn test_owner_and_repo() {
        let p = provider(ProviderKind::GitHub, "github.com", "owner/repo");
        assert_eq!(p.owner_and_repo(), Some(("owner", "repo")));

        let p = provider(
            ProviderKind::AzureDevOps,
            "dev.azure.com",
            "org/project/_git/repo",
        );
        assert_eq!(p.owner_and_repo(), Some(("org", "repo")));
    }
}
