//! Gerrit / Google Source (gitiles) URL shapes.
//!
//! Gitiles addresses everything through `+`: `{base}/+/{rev}/{path}`.
//! Line anchors are single-line only; comparison and pull-request pages
//! have no equivalent (reviews live in Gerrit proper).

use crate::domain::{LineRange, RemoteResource};
use crate::reverse::{split_url_parts, PathParse};

pub(super) fn url_for(base: &str, resource: &RemoteResource) -> Option<String> {
    match resource {
        RemoteResource::Repo => Some(base.to_string()),
        RemoteResource::Branches => Some(format!("{base}/+refs")),
        RemoteResource::Branch { name } => Some(format!("{base}/+/{name}")),
        RemoteResource::Commit { sha } => Some(format!("{base}/+/{sha}")),
        RemoteResource::Comparison { .. } => None,
        RemoteResource::CreatePullRequest { .. } => None,
        RemoteResource::File {
            path,
            branch_or_tag,
            range,
        } => {
            let rev = branch_or_tag.as_deref().unwrap_or("HEAD");
            Some(format!("{base}/+/{rev}/{path}{}", fragment(range.as_ref())))
        }
        RemoteResource::Revision {
            path,
            sha,
            branch_or_tag,
            range,
        } => {
            let rev = sha
                .as_deref()
                .or(branch_or_tag.as_deref())
                .unwrap_or("HEAD");
            Some(format!("{base}/+/{rev}/{path}{}", fragment(range.as_ref())))
        }
    }
}

pub(super) fn parse(rest: &str) -> Option<PathParse> {
    let (path, _query, frag) = split_url_parts(rest);
    let joined = path.strip_prefix("+/")?;
    // Fully qualified branch refs keep their slash ambiguity after the
    // refs/heads/ prefix is dropped.
    let joined = joined.strip_prefix("refs/heads/").unwrap_or(joined);
    let start = frag.and_then(|f| f.parse().ok());
    Some(PathParse::NeedsDisambiguation {
        joined: joined.to_string(),
        start_line: start,
        end_line: None,
    })
}

/// Single-line anchor only; a range collapses to its start line.
fn fragment(range: Option<&LineRange>) -> String {
    match range {
        Some(LineRange { start, .. }) => format!("#{start}"),
        None => String::new(),
    }
}
