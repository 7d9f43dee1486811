//! Azure DevOps URL shapes.
//!
//! Files are addressed through query strings on the repository base:
//! `?path=/src/app.ts&version=GBmain&line=10&lineEnd=20`. `GB` prefixes a
//! branch version, `GC` a commit.

use crate::domain::{AutolinkTemplate, LineRange, RemoteDescriptor, RemoteResource};
use crate::reverse::{query_param, split_url_parts, LocalFileInfo, PathParse};

pub(super) fn url_for(base: &str, resource: &RemoteResource) -> Option<String> {
    match resource {
        RemoteResource::Repo => Some(base.to_string()),
        RemoteResource::Branches => Some(format!("{base}/branches")),
        RemoteResource::Branch { name } => Some(format!("{base}?version=GB{name}")),
        RemoteResource::Commit { sha } => Some(format!("{base}/commit/{sha}")),
        RemoteResource::Comparison {
            base: base_ref,
            compare,
            ..
        } => Some(format!(
            "{base}/branchCompare?baseVersion=GB{base_ref}&targetVersion=GB{compare}"
        )),
        RemoteResource::CreatePullRequest {
            base_branch,
            compare_branch,
        } => {
            let mut url = format!("{base}/pullrequestcreate?sourceRef={compare_branch}");
            if let Some(b) = base_branch {
                url.push_str(&format!("&targetRef={b}"));
            }
            Some(url)
        }
        RemoteResource::File {
            path,
            branch_or_tag,
            range,
        } => {
            let mut url = format!("{base}?path=/{path}");
            if let Some(b) = branch_or_tag {
                url.push_str(&format!("&version=GB{b}"));
            }
            url.push_str(&line_params(range.as_ref()));
            Some(url)
        }
        RemoteResource::Revision {
            path,
            sha,
            branch_or_tag,
            range,
        } => {
            let mut url = format!("{base}?path=/{path}");
            match (sha, branch_or_tag) {
                (Some(sha), _) => url.push_str(&format!("&version=GC{sha}")),
                (None, Some(b)) => url.push_str(&format!("&version=GB{b}")),
                (None, None) => {}
            }
            url.push_str(&line_params(range.as_ref()));
            Some(url)
        }
    }
}

pub(super) fn parse(rest: &str) -> Option<PathParse> {
    let (_path, query, _frag) = split_url_parts(rest);
    let query = query?;
    let file = percent_decode(query_param(query, "path")?);
    let file = file.trim_start_matches('/').to_string();
    if file.is_empty() {
        return None;
    }
    let start = query_param(query, "line").and_then(|v| v.parse().ok());
    let end = query_param(query, "lineEnd").and_then(|v| v.parse().ok());
    Some(PathParse::Resolved(LocalFileInfo {
        path: file,
        start_line: start,
        end_line: end,
    }))
}

pub(super) fn autolink_templates(descriptor: &RemoteDescriptor, name: &str) -> Vec<AutolinkTemplate> {
    // Work items live at the project level, above the repository.
    let project = descriptor
        .path
        .split("/_git/")
        .next()
        .unwrap_or(&descriptor.path);
    let mut t = AutolinkTemplate::issue(
        "#",
        format!(
            "{}://{}/{}/_workitems/edit/<num>",
            descriptor.protocol.web_scheme(),
            descriptor.domain,
            project
        ),
    );
    t.title_template = Some(format!("Open work item #<num> on {name}"));
    vec![t]
}

fn line_params(range: Option<&LineRange>) -> String {
    match range {
        Some(LineRange {
            start,
            end: Some(end),
        }) => format!("&line={start}&lineEnd={end}"),
        Some(LineRange { start, end: None }) => format!("&line={start}"),
        None => String::new(),
    }
}

/// Minimal percent decoding for the escapes Azure puts in path params.
fn percent_decode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(h), Some(l)) = (
                bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16)),
                bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16)),
            ) {
                out.push((h * 16 + l) as u8 as char);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    out
}
