//! Dynamic autolinks: provider-supplied detection with custom parse and
//! render logic, for references a prefix+pattern template cannot express.
//!
//! The one shipped implementation handles GitHub-style cross-repo
//! mentions (`owner/repo#123`), which resolve against the mentioned
//! repository rather than the remote's own.

use regex::Regex;

use hostlink_core::RemoteProvider;

/// A cross-repo reference captured from text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DynamicRef {
    pub owner: String,
    pub repo: String,
    pub id: String,
}

impl DynamicRef {
    /// Key used for enrichment maps and footnote reuse.
    pub fn key(&self) -> String {
        format!("{}/{}#{}", self.owner, self.repo, self.id)
    }
}

/// One detected occurrence, with the span to replace.
#[derive(Debug, Clone)]
pub struct DynamicMatch {
    pub range: std::ops::Range<usize>,
    /// The anchor character preceding the reference (kept in output).
    pub anchor: String,
    /// The reference text exactly as matched.
    pub text: String,
    pub reference: DynamicRef,
}

/// Detects `owner/repo#123` mentions for providers that support them.
#[derive(Debug)]
pub struct CrossRepoAutolink {
    plain: Regex,
    markdown: Regex,
}

impl Default for CrossRepoAutolink {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossRepoAutolink {
    pub fn new() -> Self {
        // Owner and repo follow hosting-service naming: word chars,
        // dots, and dashes, starting alphanumeric.
        let plain = Regex::new(
            r"(^|\s|\(|\\\[)([0-9A-Za-z][\w.-]*)/([0-9A-Za-z][\w.-]*)#([0-9]+)",
        )
        .expect("cross-repo pattern");
        // Markdown context accepts the escaped and the raw form.
        let markdown = Regex::new(
            r"(^|\s|\(|\\\[)([0-9A-Za-z][\w.-]*)/([0-9A-Za-z][\w.-]*)(?:\\#|#)([0-9]+)",
        )
        .expect("cross-repo markdown pattern");
        Self { plain, markdown }
    }

    /// Find all cross-repo references in `text`, left to right.
    pub fn find(&self, text: &str, markdown: bool) -> Vec<DynamicMatch> {
        let re = if markdown { &self.markdown } else { &self.plain };
        re.captures_iter(text)
            .map(|caps| {
                let whole = caps.get(0).expect("match");
                let anchor = caps[1].to_string();
                DynamicMatch {
                    range: whole.range(),
                    text: text[whole.start() + anchor.len()..whole.end()].to_string(),
                    anchor,
                    reference: DynamicRef {
                        owner: caps[2].to_string(),
                        repo: caps[3].to_string(),
                        id: caps[4].to_string(),
                    },
                }
            })
            .collect()
    }

    /// The issue URL a reference points at, on the provider's host.
    pub fn url_for(&self, provider: &RemoteProvider, reference: &DynamicRef) -> String {
        provider.cross_repo_issue_url(&reference.owner, &reference.repo, &reference.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_cross_repo_reference() {
        let autolink = CrossRepoAutolink::new();
        let matches = autolink.find("see ORG/OTHER#7 for details", false);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].reference.owner, "ORG");
        assert_eq!(matches[0].reference.repo, "OTHER");
        assert_eq!(matches[0].reference.id, "7");
        assert_eq!(matches[0].text, "ORG/OTHER#7");
    }

    #[test]
    fn test_anchoring_rejects_mid_word() {
        let autolink = CrossRepoAutolink::new();
        assert!(autolink.find("xORG/OTHER#7", false).is_empty());
    }

    #[test]
    fn test_markdown_variant() {
        let autolink = CrossRepoAutolink::new();
        let matches = autolink.find(r"see ORG/OTHER\#7", true);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].reference.key(), "ORG/OTHER#7");
    }

    #[test]
    fn test_markdown_variant_accepts_raw_hash() {
        let autolink = CrossRepoAutolink::new();
        let matches = autolink.find("see ORG/OTHER#7", true);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "ORG/OTHER#7");
    }

    #[test]
    fn test_plain_pattern_ignores_escaped_hash() {
        let autolink = CrossRepoAutolink::new();
        assert!(autolink.find(r"see ORG/OTHER\#7", false).is_empty());
    }
}
