//! Remote descriptor: the parsed identity of a configured git remote.

use serde::{Deserialize, Serialize};

/// Transport protocol of a remote URL.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RemoteProtocol {
    Https,
    Http,
    Ssh,
    Git,
}

impl RemoteProtocol {
    /// Scheme used when building web URLs for this remote.
    ///
    /// SSH and git-protocol remotes still get https web links.
    pub fn web_scheme(&self) -> &'static str {
        match self {
            RemoteProtocol::Http => "http",
            _ => "https",
        }
    }
}

/// Parsed identity of a git remote: where it lives and what repository
/// path it points at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteDescriptor {
    /// Host name, e.g. `github.com`.
    pub domain: String,

    /// Repository path with any trailing `.git` stripped, e.g. `owner/repo`.
    pub path: String,

    /// Transport protocol the remote was configured with.
    pub protocol: RemoteProtocol,

    /// User-supplied display name replacing the provider default.
    pub display_name_override: Option<String>,

    /// Whether this descriptor came from a user-defined remote entry.
    pub is_user_defined: bool,
}

impl RemoteDescriptor {
    /// Create a descriptor for an https remote.
    pub fn new(domain: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            path: normalize_path(&path.into()),
            protocol: RemoteProtocol::Https,
            display_name_override: None,
            is_user_defined: false,
        }
    }

    /// Parse a git remote URL into a descriptor.
    ///
    /// Accepts the common forms:
    /// - `https://host/owner/repo.git`
    /// - `http://host/owner/repo`
    /// - `ssh://git@host/owner/repo.git`
    /// - `git@host:owner/repo.git` (scp-like)
    /// - `git://host/owner/repo.git`
    pub fn from_git_url(url: &str) -> Option<Self> {
        let url = url.trim();

        let (protocol, rest) = if let Some(rest) = url.strip_prefix("https://") {
            (RemoteProtocol::Https, rest)
        } else if let Some(rest) = url.strip_prefix("http://") {
            (RemoteProtocol::Http, rest)
        } else if let Some(rest) = url.strip_prefix("ssh://") {
            (RemoteProtocol::Ssh, rest)
        } else if let Some(rest) = url.strip_prefix("git://") {
            (RemoteProtocol::Git, rest)
        } else if url.contains('@') && url.contains(':') && !url.contains("://") {
            // scp-like syntax: git@host:owner/repo.git
            let (_user, rest) = url.split_once('@')?;
            let (domain, path) = rest.split_once(':')?;
            if domain.is_empty() || path.is_empty() {
                return None;
            }
            return Some(Self {
                domain: domain.to_string(),
                path: normalize_path(path),
                protocol: RemoteProtocol::Ssh,
                display_name_override: None,
                is_user_defined: false,
            });
        } else {
            return None;
        };

        // Drop any user@ prefix before the host.
        let rest = rest.rsplit_once('@').map(|(_, r)| r).unwrap_or(rest);
        let (domain, path) = rest.split_once('/')?;
        // Drop a :port suffix from the authority.
        let domain = domain.split(':').next()?;
        if domain.is_empty() || path.is_empty() {
            return None;
        }

        Some(Self {
            domain: domain.to_string(),
            path: normalize_path(path),
            protocol,
            display_name_override: None,
            is_user_defined: false,
        })
    }

    /// The full remote URL in web form, e.g. `https://github.com/owner/repo`.
    pub fn url(&self) -> String {
        format!("{}://{}/{}", self.protocol.web_scheme(), self.domain, self.path)
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.trim_matches('/');
    path.strip_suffix(".git").unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_https_url() {
        let d = RemoteDescriptor::from_git_url("https://github.com/owner/repo.git").unwrap();
        assert_eq!(d.domain, "github.com");
        assert_eq!(d.path, "owner/repo");
        assert_eq!(d.protocol, RemoteProtocol::Https);
    }

    #[test]
    fn test_parse_scp_like_url() {
        let d = RemoteDescriptor::from_git_url("git@gitlab.com:group/sub/project.git").unwrap();
        assert_eq!(d.domain, "gitlab.com");
        assert_eq!(d.path, "group/sub/project");
        assert_eq!(d.protocol, RemoteProtocol::Ssh);
    }

    #[test]
    fn test_parse_ssh_url_with_user_and_port() {
        let d = RemoteDescriptor::from_git_url("ssh://git@bitbucket.example.com:7999/scm/proj/repo.git")
            .unwrap();
        assert_eq!(d.domain, "bitbucket.example.com");
        assert_eq!(d.path, "scm/proj/repo");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(RemoteDescriptor::from_git_url("not a url").is_none());
        assert!(RemoteDescriptor::from_git_url("").is_none());
    }

    #[test]
    fn test_web_url_for_ssh_remote_uses_https() {
        let d = RemoteDescriptor::from_git_url("git@github.com:owner/repo.git").unwrap();
        assert_eq!(d.url(), "https://github.com/owner/repo");
    }
}
