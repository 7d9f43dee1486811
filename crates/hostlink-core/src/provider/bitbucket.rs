//! Bitbucket Cloud and Bitbucket Server (Data Center) URL shapes.
//!
//! Server remotes are cloned through `scm/PROJ/repo` but browsed through
//! `projects/PROJ/repos/repo`; [`server_web_path`] performs that rewrite.

use crate::domain::{AutolinkCategory, AutolinkTemplate, LineRange, RemoteResource};
use crate::reverse::{split_url_parts, PathParse};

/// Rewrite a clone path like `scm/PROJ/repo` to the browse form
/// `projects/PROJ/repos/repo`. Paths already in browse form pass through.
pub(super) fn server_web_path(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("scm/") {
        if let Some((project, repo)) = rest.split_once('/') {
            return format!("projects/{project}/repos/{repo}");
        }
    }
    path.to_string()
}

pub(super) fn cloud_url_for(base: &str, resource: &RemoteResource) -> Option<String> {
    match resource {
        RemoteResource::Repo => Some(base.to_string()),
        RemoteResource::Branches => Some(format!("{base}/branches")),
        RemoteResource::Branch { name } => Some(format!("{base}/branch/{name}")),
        RemoteResource::Commit { sha } => Some(format!("{base}/commits/{sha}")),
        // Bitbucket has its own comparison notation; refs are joined with
        // an encoded CR, compare side first.
        RemoteResource::Comparison {
            base: base_ref,
            compare,
            ..
        } => Some(format!("{base}/branches/compare/{compare}%0D{base_ref}")),
        RemoteResource::CreatePullRequest { compare_branch, .. } => {
            Some(format!("{base}/pull-requests/new?source={compare_branch}&t=1"))
        }
        RemoteResource::File {
            path,
            branch_or_tag,
            range,
        } => {
            let rev = branch_or_tag.as_deref().unwrap_or("HEAD");
            Some(format!(
                "{base}/src/{rev}/{path}{}",
                cloud_fragment(range.as_ref())
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
                "{base}/src/{rev}/{path}{}",
                cloud_fragment(range.as_ref())
            ))
        }
    }
}

pub(super) fn cloud_parse(rest: &str) -> Option<PathParse> {
    let (path, _query, frag) = split_url_parts(rest);
    let joined = path.strip_prefix("src/")?;
    let (start, end) = frag.map(cloud_parse_fragment).unwrap_or((None, None));
    Some(PathParse::NeedsDisambiguation {
        joined: joined.to_string(),
        start_line: start,
        end_line: end,
    })
}

pub(super) fn server_url_for(base: &str, resource: &RemoteResource) -> Option<String> {
    match resource {
        RemoteResource::Repo => Some(base.to_string()),
        RemoteResource::Branches => Some(format!("{base}/branches")),
        RemoteResource::Branch { name } => Some(format!("{base}/commits?until={name}")),
        RemoteResource::Commit { sha } => Some(format!("{base}/commits/{sha}")),
        RemoteResource::Comparison {
            base: base_ref,
            compare,
            ..
        } => Some(format!(
            "{base}/compare/commits?sourceBranch={compare}&targetBranch={base_ref}"
        )),
        RemoteResource::CreatePullRequest {
            base_branch,
            compare_branch,
        } => {
            let mut url = format!("{base}/pull-requests?create&sourceBranch={compare_branch}");
            if let Some(b) = base_branch {
                url.push_str(&format!("&targetBranch={b}"));
            }
            Some(url)
        }
        RemoteResource::File {
            path,
            branch_or_tag,
            range,
        } => {
            let mut url = format!("{base}/browse/{path}");
            if let Some(rev) = branch_or_tag {
                url.push_str(&format!("?at={rev}"));
            }
            url.push_str(&server_fragment(range.as_ref()));
            Some(url)
        }
        RemoteResource::Revision {
            path,
            sha,
            branch_or_tag,
            range,
        } => {
            let mut url = format!("{base}/browse/{path}");
            if let Some(rev) = sha.as_deref().or(branch_or_tag.as_deref()) {
                url.push_str(&format!("?at={rev}"));
            }
            url.push_str(&server_fragment(range.as_ref()));
            Some(url)
        }
    }
}

pub(super) fn server_parse(rest: &str) -> Option<PathParse> {
    let (path, _query, frag) = split_url_parts(rest);
    // The file path is explicit in browse URLs; no branch lookup needed.
    let file = path.strip_prefix("browse/")?;
    if file.is_empty() {
        return None;
    }
    let (start, end) = frag.map(server_parse_fragment).unwrap_or((None, None));
    Some(PathParse::Resolved(crate::reverse::LocalFileInfo {
        path: file.to_string(),
        start_line: start,
        end_line: end,
    }))
}

pub(super) fn cloud_autolink_templates(base: &str, name: &str) -> Vec<AutolinkTemplate> {
    let mut issue = AutolinkTemplate::issue("issue #", format!("{base}/issues/<num>"));
    issue.case_insensitive = true;
    issue.title_template = Some(format!("Open issue #<num> on {name}"));

    let pr = AutolinkTemplate {
        match_prefix: "pull request #".to_string(),
        url_template: format!("{base}/pull-requests/<num>"),
        alphanumeric_id: false,
        case_insensitive: true,
        title_template: Some(format!("Open pull request #<num> on {name}")),
        category: AutolinkCategory::PullRequest,
    };

    vec![issue, pr]
}

pub(super) fn server_autolink_templates(base: &str, name: &str) -> Vec<AutolinkTemplate> {
    vec![AutolinkTemplate {
        match_prefix: "pull request #".to_string(),
        url_template: format!("{base}/pull-requests/<num>"),
        alphanumeric_id: false,
        case_insensitive: true,
        title_template: Some(format!("Open pull request #<num> on {name}")),
        category: AutolinkCategory::PullRequest,
    }]
}

/// `#lines-10` or `#lines-10:20`.
fn cloud_fragment(range: Option<&LineRange>) -> String {
    match range {
        Some(LineRange {
            start,
            end: Some(end),
        }) => format!("#lines-{start}:{end}"),
        Some(LineRange { start, end: None }) => format!("#lines-{start}"),
        None => String::new(),
    }
}

fn cloud_parse_fragment(frag: &str) -> (Option<u32>, Option<u32>) {
    let Some(frag) = frag.strip_prefix("lines-") else {
        return (None, None);
    };
    match frag.split_once(':') {
        Some((a, b)) => (a.parse().ok(), b.parse().ok()),
        None => (frag.parse().ok(), None),
    }
}

/// `#10` or `#10-20`.
fn server_fragment(range: Option<&LineRange>) -> String {
    match range {
        Some(LineRange {
            start,
            end: Some(end),
        }) => format!("#{start}-{end}"),
        Some(LineRange { start, end: None }) => format!("#{start}"),
        None => String::new(),
    }
}

fn server_parse_fragment(frag: &str) -> (Option<u32>, Option<u32>) {
    match frag.split_once('-') {
        Some((a, b)) => (a.parse().ok(), b.parse().ok()),
        None => (frag.parse().ok(), None),
    }
}
