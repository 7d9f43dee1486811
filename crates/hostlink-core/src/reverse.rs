//! Reverse URL mapping: turn a pasted hosting-service URL back into a
//! local file path plus line range.
//!
//! The hard part is branch disambiguation. Branch names may contain `/`,
//! so a URL like `.../blob/feature/login/src/app.ts` cannot be split by
//! position. The shared resolver walks backward from the path's end,
//! building decreasing branch-name candidates, and asks the repository
//! which of them exist in one batched query.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::Result;

/// Result of reverse-mapping a hosting URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileInfo {
    /// Repository-relative file path.
    pub path: String,
    /// 1-based start line, if the URL carried one.
    pub start_line: Option<u32>,
    /// 1-based end line, if the URL carried a range.
    pub end_line: Option<u32>,
}

/// Batched branch-name lookup against the local repository.
///
/// Implementations compare against short branch names with the remote
/// prefix stripped (`origin/feature/login` counts as `feature/login`).
#[async_trait]
pub trait LocalBranchLookup: Send + Sync {
    /// Return the subset of `candidates` that exist as branches.
    async fn branches_matching(&self, candidates: &[String]) -> Result<Vec<String>>;
}

/// Intermediate result of a provider's URL parse, before branch lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathParse {
    /// The revision boundary was explicit in the URL.
    Resolved(LocalFileInfo),
    /// `joined` holds `revision/path` with an unknown boundary.
    NeedsDisambiguation {
        joined: String,
        start_line: Option<u32>,
        end_line: Option<u32>,
    },
}

/// True for a full-length (40 hex chars) commit hash.
pub fn is_full_sha(s: &str) -> bool {
    s.len() == 40 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// True for an abbreviated commit hash (7 to 39 hex chars).
pub fn is_abbreviated_sha(s: &str) -> bool {
    (7..40).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Resolve a `revision/path` string with an unknown boundary.
///
/// Phase 1: if the first segment is a full commit hash, the remainder is
/// the file path at that revision.
///
/// Phase 2: walk backward from the path's end, cutting at each `/` to
/// build decreasing branch-name candidates (`a/b/c`, `a/b`, `a`), issue
/// one batched lookup, and take the first (longest) candidate that
/// exists. An abbreviated-hash first segment is kept as a lower-priority
/// fallback, used only when no branch candidate matches.
pub async fn resolve_revision_and_path(
    joined: &str,
    start_line: Option<u32>,
    end_line: Option<u32>,
    branches: &dyn LocalBranchLookup,
) -> Result<Option<LocalFileInfo>> {
    let segments: Vec<&str> = joined.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return Ok(None);
    }

    if is_full_sha(segments[0]) {
        return Ok(Some(LocalFileInfo {
            path: segments[1..].join("/"),
            start_line,
            end_line,
        }));
    }

    // Longest candidate first, so a/b beats a when both branches exist.
    let mut candidates: Vec<(String, String)> = Vec::with_capacity(segments.len() - 1);
    for cut in (1..segments.len()).rev() {
        candidates.push((segments[..cut].join("/"), segments[cut..].join("/")));
    }

    let names: Vec<String> = candidates.iter().map(|(branch, _)| branch.clone()).collect();
    let existing: HashSet<String> = branches
        .branches_matching(&names)
        .await?
        .into_iter()
        .collect();

    for (branch, suffix) in &candidates {
        if existing.contains(branch) {
            return Ok(Some(LocalFileInfo {
                path: suffix.clone(),
                start_line,
                end_line,
            }));
        }
    }

    if is_abbreviated_sha(segments[0]) {
        return Ok(Some(LocalFileInfo {
            path: segments[1..].join("/"),
            start_line,
            end_line,
        }));
    }

    Ok(None)
}

/// Strip scheme and authority, returning the remainder after
/// `{domain}/{repo_base_path}/`. Case-insensitive on the domain.
pub(crate) fn strip_repo_base<'a>(url: &'a str, domain: &str, base_path: &str) -> Option<&'a str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let (host, path) = rest.split_once('/')?;
    let host = host.split(':').next()?;
    if !host.eq_ignore_ascii_case(domain) {
        return None;
    }
    let path = path.trim_start_matches('/');
    let base = base_path.trim_matches('/');
    let remainder = if base.is_empty() {
        path
    } else if path
        .get(..base.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(base))
    {
        path[base.len()..].trim_start_matches('/')
    } else {
        return None;
    };
    Some(remainder)
}

/// Split a URL remainder into (path, query, fragment).
pub(crate) fn split_url_parts(rest: &str) -> (&str, Option<&str>, Option<&str>) {
    let (before_fragment, fragment) = match rest.split_once('#') {
        Some((b, f)) => (b, Some(f)),
        None => (rest, None),
    };
    let (path, query) = match before_fragment.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (before_fragment, None),
    };
    (path, query, fragment)
}

/// Look up one key in a query string.
pub(crate) fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}
