//! Gitea URL shapes.

use crate::domain::{AutolinkTemplate, LineRange, RemoteResource};
use crate::reverse::{split_url_parts, PathParse};

pub(super) fn url_for(base: &str, resource: &RemoteResource) -> Option<String> {
    match resource {
        RemoteResource::Repo => Some(base.to_string()),
        RemoteResource::Branches => Some(format!("{base}/branches")),
        RemoteResource::Branch { name } => Some(format!("{base}/src/branch/{name}")),
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
            None => format!("{base}/compare/{compare_branch}"),
        }),
        RemoteResource::File {
            path,
            branch_or_tag,
            range,
        } => Some(match branch_or_tag {
            Some(b) => format!("{base}/src/branch/{b}/{path}{}", fragment(range.as_ref())),
            None => format!("{base}/src/{path}{}", fragment(range.as_ref())),
        }),
        RemoteResource::Revision {
            path,
            sha,
            branch_or_tag,
            range,
        } => Some(match (sha, branch_or_tag) {
            (Some(sha), _) => {
                format!("{base}/src/commit/{sha}/{path}{}", fragment(range.as_ref()))
            }
            (None, Some(b)) => {
                format!("{base}/src/branch/{b}/{path}{}", fragment(range.as_ref()))
            }
            (None, None) => format!("{base}/src/{path}{}", fragment(range.as_ref())),
        }),
    }
}

pub(super) fn parse(rest: &str) -> Option<PathParse> {
    let (path, _query, frag) = split_url_parts(rest);
    let after_src = path
        .strip_prefix("src/")
        .or_else(|| path.strip_prefix("raw/"))?;
    let (start, end) = frag.map(parse_fragment).unwrap_or((None, None));

    if let Some(joined) = after_src.strip_prefix("commit/") {
        // Explicit commit segment; the remainder is rev/path with a full
        // hash first, which the shared resolver short-circuits on.
        return Some(PathParse::NeedsDisambiguation {
            joined: joined.to_string(),
            start_line: start,
            end_line: end,
        });
    }
    let joined = after_src.strip_prefix("branch/").unwrap_or(after_src);
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

fn parse_fragment(frag: &str) -> (Option<u32>, Option<u32>) {
    super::github::parse_fragment(frag)
}
