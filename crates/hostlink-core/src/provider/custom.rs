//! User-defined providers built from explicit URL templates.
//!
//! Templates use `{...}` tokens: `{repo}` (base URL), `{branch}`, `{id}`
//! (commit sha), `{path}`, `{base}`/`{compare}` (comparison refs),
//! `{line}`/`{start}`/`{end}` (line anchors).

use serde::{Deserialize, Serialize};

use crate::domain::{LineRange, RemoteResource};

/// URL templates for a user-defined provider. Every capability is
/// optional; missing templates make `build_url` return `None` for the
/// corresponding resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomUrls {
    pub repository: Option<String>,
    pub branches: Option<String>,
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub comparison: Option<String>,
    pub create_pull_request: Option<String>,
    /// File without a ref.
    pub file: Option<String>,
    pub file_in_branch: Option<String>,
    pub file_in_commit: Option<String>,
    /// Suffix appended for a single line, e.g. `#L{line}`.
    pub file_line: Option<String>,
    /// Suffix appended for a range, e.g. `#L{start}-L{end}`.
    pub file_range: Option<String>,
}

pub(super) fn url_for(urls: &CustomUrls, base: &str, resource: &RemoteResource) -> Option<String> {
    let sub = |template: &str| template.replace("{repo}", base);
    match resource {
        RemoteResource::Repo => Some(sub(urls.repository.as_deref()?)),
        RemoteResource::Branches => Some(sub(urls.branches.as_deref()?)),
        RemoteResource::Branch { name } => {
            Some(sub(urls.branch.as_deref()?).replace("{branch}", name))
        }
        RemoteResource::Commit { sha } => Some(sub(urls.commit.as_deref()?).replace("{id}", sha)),
        RemoteResource::Comparison {
            base: base_ref,
            compare,
            ..
        } => Some(
            sub(urls.comparison.as_deref()?)
                .replace("{base}", base_ref)
                .replace("{compare}", compare),
        ),
        RemoteResource::CreatePullRequest {
            base_branch,
            compare_branch,
        } => Some(
            sub(urls.create_pull_request.as_deref()?)
                .replace("{base}", base_branch.as_deref().unwrap_or(""))
                .replace("{compare}", compare_branch),
        ),
        RemoteResource::File {
            path,
            branch_or_tag,
            range,
        } => {
            let url = match branch_or_tag {
                Some(b) => sub(urls.file_in_branch.as_deref()?)
                    .replace("{branch}", b)
                    .replace("{path}", path),
                None => sub(urls.file.as_deref()?).replace("{path}", path),
            };
            Some(url + &line_suffix(urls, range.as_ref()))
        }
        RemoteResource::Revision {
            path,
            sha,
            branch_or_tag,
            range,
        } => {
            let url = match (sha, branch_or_tag) {
                (Some(sha), _) => sub(urls.file_in_commit.as_deref()?)
                    .replace("{id}", sha)
                    .replace("{path}", path),
                (None, Some(b)) => sub(urls.file_in_branch.as_deref()?)
                    .replace("{branch}", b)
                    .replace("{path}", path),
                (None, None) => sub(urls.file.as_deref()?).replace("{path}", path),
            };
            Some(url + &line_suffix(urls, range.as_ref()))
        }
    }
}

fn line_suffix(urls: &CustomUrls, range: Option<&LineRange>) -> String {
    match range {
        Some(LineRange {
            start,
            end: Some(end),
        }) => urls
            .file_range
            .as_deref()
            .map(|t| {
                t.replace("{start}", &start.to_string())
                    .replace("{end}", &end.to_string())
            })
            .unwrap_or_default(),
        Some(LineRange { start, end: None }) => urls
            .file_line
            .as_deref()
            .map(|t| t.replace("{line}", &start.to_string()))
            .unwrap_or_default(),
        None => String::new(),
    }
}
