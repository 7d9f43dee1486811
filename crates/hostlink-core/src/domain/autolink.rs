//! Autolink templates: rules converting text patterns into hyperlinks.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Placeholder in URL and title templates that gets replaced with the
/// matched id.
pub const ID_PLACEHOLDER: &str = "<num>";

/// What kind of reference a template detects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AutolinkCategory {
    Issue,
    PullRequest,
    Change,
}

/// A rule converting `prefix` + id into a hyperlink.
///
/// Immutable once constructed; detection patterns are compiled from its
/// fields and cached by [`fingerprint`](AutolinkTemplate::fingerprint).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutolinkTemplate {
    /// Literal text immediately preceding the id, e.g. `#` or `JIRA-`.
    pub match_prefix: String,

    /// URL with an [`ID_PLACEHOLDER`] to interpolate the matched id into.
    pub url_template: String,

    /// When true, ids match `[A-Za-z0-9_]+` instead of `[0-9]+`.
    pub alphanumeric_id: bool,

    /// When true, the prefix matches case-insensitively.
    pub case_insensitive: bool,

    /// Optional tooltip/title with an [`ID_PLACEHOLDER`].
    pub title_template: Option<String>,

    /// What the template links to.
    pub category: AutolinkCategory,
}

impl AutolinkTemplate {
    /// Convenience constructor for a numeric-issue template.
    pub fn issue(match_prefix: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            match_prefix: match_prefix.into(),
            url_template: url_template.into(),
            alphanumeric_id: false,
            case_insensitive: false,
            title_template: None,
            category: AutolinkCategory::Issue,
        }
    }

    /// Interpolate an id into the URL template.
    pub fn url_for(&self, id: &str) -> String {
        self.url_template.replace(ID_PLACEHOLDER, id)
    }

    /// Interpolate an id into the title template, if one is set.
    pub fn title_for(&self, id: &str) -> Option<String> {
        self.title_template
            .as_ref()
            .map(|t| t.replace(ID_PLACEHOLDER, id))
    }

    /// Deterministic identity of this template's detection-relevant fields.
    ///
    /// Two templates share a compiled pattern only if every field that
    /// shapes the pattern is identical.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.match_prefix.as_bytes());
        hasher.update([0]);
        hasher.update(self.url_template.as_bytes());
        hasher.update([0]);
        hasher.update([self.alphanumeric_id as u8, self.case_insensitive as u8]);
        if let Some(title) = &self.title_template {
            hasher.update([0]);
            hasher.update(title.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}
