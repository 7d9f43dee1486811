//! Provider registry: ordered matchers mapping a remote's (url, domain,
//! path) to a concrete hosting provider.
//!
//! User-configured entries come first, then built-ins in fixed order.
//! First match wins; order is the only tie-break.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{RemoteDescriptor, RemoteProtocol};
use crate::provider::{CustomUrls, ProviderKind, RemoteProvider};

/// How a registry entry decides whether it owns a remote.
#[derive(Debug, Clone)]
enum ProviderMatcher {
    /// Exact case-insensitive domain equality.
    Domain(String),
    /// Regex tested against the domain; user-defined entries also test
    /// the raw url, re-deriving domain/path from two capture groups.
    Pattern(Regex),
}

#[derive(Debug, Clone)]
struct RegistryEntry {
    matcher: ProviderMatcher,
    kind: ProviderKind,
    display_name: Option<String>,
    custom_urls: Option<CustomUrls>,
    is_user_defined: bool,
}

/// A user-supplied remote entry from configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRemoteEntry {
    /// Exact domain to match (one of `domain`/`regex` is required).
    #[serde(default)]
    pub domain: Option<String>,

    /// Regex matcher. Against a raw url it must expose two capture
    /// groups: domain and repository path.
    #[serde(default)]
    pub regex: Option<String>,

    /// Which provider variant to use for matching remotes.
    #[serde(rename = "type")]
    pub kind: ProviderKind,

    /// Display name replacing the variant default.
    #[serde(default)]
    pub name: Option<String>,

    /// URL templates; required when `type = "custom"`.
    #[serde(default)]
    pub urls: Option<CustomUrls>,
}

/// Ordered provider matcher list.
///
/// The entry list is replaced wholesale on reload, never mutated in
/// place, so concurrent matching against an old snapshot stays
/// consistent. The connected-integration set is an explicit field here
/// rather than process-wide state.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    entries: Vec<RegistryEntry>,
    connected: HashSet<String>,
}

impl ProviderRegistry {
    /// Registry with only the built-in matchers.
    pub fn new() -> Self {
        Self {
            entries: builtin_entries(),
            connected: HashSet::new(),
        }
    }

    /// Registry with user entries ahead of the built-ins.
    ///
    /// A malformed user entry is logged and skipped; the remaining
    /// entries still load.
    pub fn with_user_entries(user_entries: &[UserRemoteEntry]) -> Self {
        let mut registry = Self::new();
        registry.reload(user_entries);
        registry
    }

    /// Replace the entry list wholesale: compiled user entries first,
    /// then the built-ins in fixed order.
    pub fn reload(&mut self, user_entries: &[UserRemoteEntry]) {
        let mut entries = Vec::with_capacity(user_entries.len() + 10);
        for entry in user_entries {
            match compile_user_entry(entry) {
                Ok(compiled) => entries.push(compiled),
                Err(reason) => {
                    warn!(
                        domain = entry.domain.as_deref().unwrap_or(""),
                        regex = entry.regex.as_deref().unwrap_or(""),
                        %reason,
                        "skipping malformed remote entry"
                    );
                }
            }
        }
        entries.extend(builtin_entries());
        self.entries = entries;
    }

    /// Resolve the provider backing a remote, if any entry matches.
    pub fn resolve(&self, url: &str, domain: &str, path: &str) -> Option<RemoteProvider> {
        for entry in &self.entries {
            let matched = match &entry.matcher {
                ProviderMatcher::Domain(d) => {
                    d.eq_ignore_ascii_case(domain).then(|| (domain.to_string(), path.to_string()))
                }
                ProviderMatcher::Pattern(re) => {
                    if re.is_match(domain) {
                        Some((domain.to_string(), path.to_string()))
                    } else if entry.is_user_defined {
                        // On-prem mounts hide the real domain/path inside
                        // the url (e.g. host/bitbucket/scm/PROJ/repo).
                        re.captures(url).and_then(|caps| {
                            match (caps.get(1), caps.get(2)) {
                                (Some(d), Some(p)) => {
                                    Some((d.as_str().to_string(), p.as_str().to_string()))
                                }
                                _ => None,
                            }
                        })
                    } else {
                        None
                    }
                }
            };

            if let Some((domain, path)) = matched {
                return Some(build_provider(entry, &domain, &path));
            }
        }
        None
    }

    /// Resolve using a parsed remote descriptor.
    pub fn resolve_descriptor(&self, descriptor: &RemoteDescriptor) -> Option<RemoteProvider> {
        self.resolve(&descriptor.url(), &descriptor.domain, &descriptor.path)
    }

    /// Record that a rich integration is connected for a provider id.
    pub fn mark_connected(&mut self, provider_id: &str) {
        self.connected.insert(provider_id.to_string());
    }

    pub fn mark_disconnected(&mut self, provider_id: &str) {
        self.connected.remove(provider_id);
    }

    /// Whether a rich integration (live issue/PR metadata) is available
    /// for this provider id.
    pub fn is_connected(&self, provider_id: &str) -> bool {
        self.connected.contains(provider_id)
    }
}

fn build_provider(entry: &RegistryEntry, domain: &str, path: &str) -> RemoteProvider {
    let mut descriptor = RemoteDescriptor::new(domain, path);
    descriptor.protocol = RemoteProtocol::Https;
    descriptor.display_name_override = entry.display_name.clone();
    descriptor.is_user_defined = entry.is_user_defined;
    match (&entry.custom_urls, entry.kind) {
        (Some(urls), ProviderKind::Custom) => RemoteProvider::custom(descriptor, urls.clone()),
        _ => RemoteProvider::new(entry.kind, descriptor),
    }
}

fn compile_user_entry(entry: &UserRemoteEntry) -> Result<RegistryEntry, String> {
    let matcher = match (&entry.domain, &entry.regex) {
        (Some(domain), _) => ProviderMatcher::Domain(domain.clone()),
        (None, Some(pattern)) => {
            let re = Regex::new(pattern).map_err(|e| format!("invalid regex: {e}"))?;
            ProviderMatcher::Pattern(re)
        }
        (None, None) => return Err("entry needs a domain or a regex".to_string()),
    };
    if entry.kind == ProviderKind::Custom && entry.urls.is_none() {
        return Err("custom entry needs url templates".to_string());
    }
    Ok(RegistryEntry {
        matcher,
        kind: entry.kind,
        display_name: entry.name.clone(),
        custom_urls: entry.urls.clone(),
        is_user_defined: true,
    })
}

/// Built-in matchers in their fixed order.
fn builtin_entries() -> Vec<RegistryEntry> {
    let domain = |d: &str, kind| RegistryEntry {
        matcher: ProviderMatcher::Domain(d.to_string()),
        kind,
        display_name: None,
        custom_urls: None,
        is_user_defined: false,
    };
    let pattern = |p: &str, kind| RegistryEntry {
        matcher: ProviderMatcher::Pattern(
            Regex::new(p).expect("builtin matcher pattern"),
        ),
        kind,
        display_name: None,
        custom_urls: None,
        is_user_defined: false,
    };

    vec![
        domain("bitbucket.org", ProviderKind::BitbucketCloud),
        domain("github.com", ProviderKind::GitHub),
        domain("gitlab.com", ProviderKind::GitLab),
        pattern(r"(?i)\bdev\.azure\.com$", ProviderKind::AzureDevOps),
        pattern(r"(?i)\bbitbucket\b", ProviderKind::BitbucketServer),
        pattern(r"(?i)\bgitlab\b", ProviderKind::GitLabSelfHosted),
        pattern(r"(?i)\bvisualstudio\.com$", ProviderKind::AzureDevOps),
        pattern(r"(?i)\bgitea\b", ProviderKind::Gitea),
        pattern(r"(?i)\bgerrithub\.io$", ProviderKind::GoogleSource),
        pattern(r"(?i)\bgooglesource\.com$", ProviderKind::GoogleSource),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_kind(registry: &ProviderRegistry, domain: &str, path: &str) -> Option<ProviderKind> {
        registry
            .resolve(&format!("https://{domain}/{path}"), domain, path)
            .map(|p| p.kind())
    }

    #[test]
    fn test_builtin_domains() {
        let r = ProviderRegistry::new();
        assert_eq!(resolve_kind(&r, "github.com", "o/r"), Some(ProviderKind::GitHub));
        assert_eq!(resolve_kind(&r, "GitHub.com", "o/r"), Some(ProviderKind::GitHub));
        assert_eq!(resolve_kind(&r, "gitlab.com", "o/r"), Some(ProviderKind::GitLab));
        assert_eq!(
            resolve_kind(&r, "bitbucket.org", "o/r"),
            Some(ProviderKind::BitbucketCloud)
        );
        assert_eq!(
            resolve_kind(&r, "dev.azure.com", "org/proj/_git/repo"),
            Some(ProviderKind::AzureDevOps)
        );
        assert_eq!(
            resolve_kind(&r, "myorg.visualstudio.com", "proj/_git/repo"),
            Some(ProviderKind::AzureDevOps)
        );
        assert_eq!(
            resolve_kind(&r, "gitea.corp.net", "o/r"),
            Some(ProviderKind::Gitea)
        );
        assert_eq!(
            resolve_kind(&r, "gerrithub.io", "o/r"),
            Some(ProviderKind::GoogleSource)
        );
        assert_eq!(
            resolve_kind(&r, "chromium.googlesource.com", "chromium/src"),
            Some(ProviderKind::GoogleSource)
        );
        assert_eq!(resolve_kind(&r, "example.com", "o/r"), None);
    }

    #[test]
    fn test_substring_matchers() {
        let r = ProviderRegistry::new();
        assert_eq!(
            resolve_kind(&r, "bitbucket.corp.example.com", "scm/proj/repo"),
            Some(ProviderKind::BitbucketServer)
        );
        assert_eq!(
            resolve_kind(&r, "gitlab.corp.example.com", "group/project"),
            Some(ProviderKind::GitLabSelfHosted)
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let r = ProviderRegistry::new();
        let a = resolve_kind(&r, "bitbucket.org", "o/r");
        let b = resolve_kind(&r, "bitbucket.org", "o/r");
        // bitbucket.org matches both the exact domain entry and the
        // generic \bbitbucket\b pattern; order decides, every time.
        assert_eq!(a, Some(ProviderKind::BitbucketCloud));
        assert_eq!(a, b);
    }

    #[test]
    fn test_user_entry_beats_builtin() {
        let user = UserRemoteEntry {
            domain: Some("github.com".to_string()),
            regex: None,
            kind: ProviderKind::GitHubEnterprise,
            name: Some("Pinned".to_string()),
            urls: None,
        };
        let r = ProviderRegistry::with_user_entries(&[user]);
        let p = r
            .resolve("https://github.com/o/r", "github.com", "o/r")
            .unwrap();
        assert_eq!(p.kind(), ProviderKind::GitHubEnterprise);
        assert_eq!(p.display_name(), "Pinned");
        assert!(p.descriptor().is_user_defined);
    }

    #[test]
    fn test_malformed_user_regex_is_skipped() {
        let bad = UserRemoteEntry {
            domain: None,
            regex: Some("(unclosed".to_string()),
            kind: ProviderKind::GitHubEnterprise,
            name: None,
            urls: None,
        };
        let r = ProviderRegistry::with_user_entries(&[bad]);
        // The remote falls through to the built-ins.
        assert_eq!(
            resolve_kind(&r, "github.com", "o/r"),
            Some(ProviderKind::GitHub)
        );
    }

    #[test]
    fn test_custom_url_capture_groups_rederive_domain_and_path() {
        let user = UserRemoteEntry {
            domain: None,
            regex: Some(r"^https://([^/]+)/bitbucket/(scm/[^/]+/[^/]+)$".to_string()),
            kind: ProviderKind::BitbucketServer,
            name: None,
            urls: None,
        };
        let r = ProviderRegistry::with_user_entries(&[user]);
        let p = r
            .resolve(
                "https://host.example.com/bitbucket/scm/PROJ/repo",
                "host.example.com",
                "bitbucket/scm/PROJ/repo",
            )
            .unwrap();
        assert_eq!(p.kind(), ProviderKind::BitbucketServer);
        assert_eq!(p.descriptor().domain, "host.example.com");
        assert_eq!(p.descriptor().path, "scm/PROJ/repo");
        assert_eq!(
            p.base_url(),
            "https://host.example.com/projects/PROJ/repos/repo"
        );
    }

    #[test]
    fn test_capture_groups_ignored_for_builtins() {
        let r = ProviderRegistry::new();
        // A url that only a capture-group match could claim: built-ins
        // must not match it via the raw url.
        assert!(r
            .resolve(
                "https://host.example.com/mount/scm/PROJ/repo",
                "host.example.com",
                "mount/scm/PROJ/repo",
            )
            .is_none());
    }

    #[test]
    fn test_connected_integration_tracking() {
        let mut r = ProviderRegistry::new();
        assert!(!r.is_connected("github"));
        r.mark_connected("github");
        assert!(r.is_connected("github"));
        r.mark_disconnected("github");
        assert!(!r.is_connected("github"));
    }

    #[test]
    fn test_reload_replaces_user_entries() {
        let user = UserRemoteEntry {
            domain: Some("git.example.com".to_string()),
            regex: None,
            kind: ProviderKind::Gitea,
            name: None,
            urls: None,
        };
        let mut r = ProviderRegistry::with_user_entries(&[user]);
        assert_eq!(
            resolve_kind(&r, "git.example.com", "o/r"),
            Some(ProviderKind::Gitea)
        );
        r.reload(&[]);
        assert_eq!(resolve_kind(&r, "git.example.com", "o/r"), None);
    }
}
