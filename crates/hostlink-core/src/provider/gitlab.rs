//! GitLab (gitlab.com and self-hosted) URL shapes. Modern `/-/` paths
//! are built; both `/-/blob/` and legacy `/blob/` parse.

use crate::domain::{AutolinkCategory, AutolinkTemplate, LineRange, RemoteResource};
use crate::reverse::PathParse;

pub(super) fn url_for(base: &str, resource: &RemoteResource) -> Option<String> {
    match resource {
        RemoteResource::Repo => Some(base.to_string()),
        RemoteResource::Branches => Some(format!("{base}/-/branches")),
        RemoteResource::Branch { name } => Some(format!("{base}/-/commits/{name}")),
        RemoteResource::Commit { sha } => Some(format!("{base}/-/commit/{sha}")),
        RemoteResource::Comparison {
            base: base_ref,
            compare,
            notation,
        } => Some(format!(
            "{base}/-/compare/{base_ref}{}{compare}",
            notation.as_str()
        )),
        RemoteResource::CreatePullRequest {
            base_branch,
            compare_branch,
        } => {
            let mut url = format!(
                "{base}/-/merge_requests/new?merge_request%5Bsource_branch%5D={compare_branch}"
            );
            if let Some(b) = base_branch {
                url.push_str(&format!("&merge_request%5Btarget_branch%5D={b}"));
            }
            Some(url)
        }
        RemoteResource::File {
            path,
            branch_or_tag,
            range,
        } => {
            let rev = branch_or_tag.as_deref().unwrap_or("HEAD");
            Some(format!(
                "{base}/-/blob/{rev}/{path}{}",
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
                "{base}/-/blob/{rev}/{path}{}",
                fragment(range.as_ref())
            ))
        }
    }
}

pub(super) fn parse(rest: &str) -> Option<PathParse> {
    let (path, _query, frag) = crate::reverse::split_url_parts(rest);
    let path = path.strip_prefix("-/").unwrap_or(path);
    let joined = path
        .strip_prefix("blob/")
        .or_else(|| path.strip_prefix("raw/"))?;
    let (start, end) = frag.map(super::github::parse_fragment).unwrap_or((None, None));
    Some(PathParse::NeedsDisambiguation {
        joined: joined.to_string(),
        start_line: start,
        end_line: end,
    })
}

pub(super) fn autolink_templates(base: &str, name: &str) -> Vec<AutolinkTemplate> {
    let mut issue = AutolinkTemplate::issue("#", format!("{base}/-/issues/<num>"));
    issue.title_template = Some(format!("Open issue #<num> on {name}"));

    let merge_request = AutolinkTemplate {
        match_prefix: "!".to_string(),
        url_template: format!("{base}/-/merge_requests/<num>"),
        alphanumeric_id: false,
        case_insensitive: false,
        title_template: Some(format!("Open merge request !<num> on {name}")),
        category: AutolinkCategory::PullRequest,
    };

    vec![issue, merge_request]
}

/// `#L10` or `#L10-20` (GitLab omits the second `L`).
fn fragment(range: Option<&LineRange>) -> String {
    match range {
        Some(LineRange {
            start,
            end: Some(end),
        }) => format!("#L{start}-{end}"),
        Some(LineRange { start, end: None }) => format!("#L{start}"),
        None => String::new(),
    }
}
