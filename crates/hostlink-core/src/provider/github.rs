//! GitHub and GitHub Enterprise URL shapes.

use crate::domain::{AutolinkTemplate, LineRange, RemoteResource};
use crate::reverse::PathParse;

pub(super) fn url_for(base: &str, resource: &RemoteResource) -> Option<String> {
    match resource {
        RemoteResource::Repo => Some(base.to_string()),
        RemoteResource::Branches => Some(format!("{base}/branches")),
        RemoteResource::Branch { name } => Some(format!("{base}/commits/{name}")),
        RemoteResource::Commit { sha } => Some(format!("{base}/commit/{sha}")),
        RemoteResource::Comparison {
            base: base_ref,
            compare,
            notation,
        } => Some(format!(
            "{base}/compare/{base_ref}{}{compare}",
            notation.as_str()
        )),
        RemoteResource::CreatePullRequest {
            base_branch,
            compare_branch,
        } => Some(match base_branch {
            Some(b) => format!("{base}/compare/{b}...{compare_branch}"),
            None => format!("{base}/pull/new/{compare_branch}"),
        }),
        RemoteResource::File {
            path,
            branch_or_tag,
            range,
        } => {
            let rev = branch_or_tag.as_deref().unwrap_or("HEAD");
            Some(format!(
                "{base}/blob/{rev}/{path}{}",
                fragment(range.as_ref())
            ))
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
            Some(format!(
                "{base}/blob/{rev}/{path}{}",
                fragment(range.as_ref())
            ))
        }
    }
}

pub(super) fn parse(rest: &str) -> Option<PathParse> {
    let (path, _query, frag) = crate::reverse::split_url_parts(rest);
    let joined = path
        .strip_prefix("blob/")
        .or_else(|| path.strip_prefix("raw/"))?;
    let (start, end) = frag.map(parse_fragment).unwrap_or((None, None));
    Some(PathParse::NeedsDisambiguation {
        joined: joined.to_string(),
        start_line: start,
        end_line: end,
    })
}

pub(super) fn autolink_templates(base: &str, name: &str) -> Vec<AutolinkTemplate> {
    let mut t = AutolinkTemplate::issue("#", format!("{base}/issues/<num>"));
    t.title_template = Some(format!("Open issue #<num> on {name}"));
    vec![t]
}

/// `#L10` or `#L10-L20`.
fn fragment(range: Option<&LineRange>) -> String {
    match range {
        Some(LineRange {
            start,
            end: Some(end),
        }) => format!("#L{start}-L{end}"),
        Some(LineRange { start, end: None }) => format!("#L{start}"),
        None => String::new(),
    }
}

pub(super) fn parse_fragment(frag: &str) -> (Option<u32>, Option<u32>) {
    let frag = frag.strip_prefix('L').unwrap_or(frag);
    match frag.split_once('-') {
        Some((a, b)) => {
            let b = b.strip_prefix('L').unwrap_or(b);
            (a.parse().ok(), b.parse().ok())
        }
        None => (frag.parse().ok(), None),
    }
}
