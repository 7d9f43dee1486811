//! TOML configuration: user-defined autolink templates and custom
//! remote providers.
//!
//! ```toml
//! [[autolinks]]
//! prefix = "JIRA-"
//! url = "https://jira.example.com/browse/JIRA-<num>"
//! alphanumeric = true
//! ignore_case = true
//!
//! [[remotes]]
//! domain = "git.example.com"
//! type = "gitlab-self-hosted"
//! name = "Example GitLab"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use hostlink_core::domain::{
    AutolinkCategory, AutolinkTemplate, HostlinkError, Result, ID_PLACEHOLDER,
};
use hostlink_core::UserRemoteEntry;

/// One `[[autolinks]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutolinkEntry {
    /// Literal prefix preceding the id (e.g. `"JIRA-"`).
    pub prefix: String,

    /// URL template containing the `<num>` placeholder.
    pub url: String,

    /// Optional tooltip template, also using `<num>`.
    #[serde(default)]
    pub title: Option<String>,

    /// Accept `[A-Za-z0-9_]+` ids instead of digits only.
    #[serde(default)]
    pub alphanumeric: bool,

    /// Match the prefix case-insensitively.
    #[serde(default)]
    pub ignore_case: bool,
}

/// Root configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostlinkConfig {
    #[serde(default)]
    pub autolinks: Vec<AutolinkEntry>,

    #[serde(default)]
    pub remotes: Vec<UserRemoteEntry>,
}

impl HostlinkConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| HostlinkError::Configuration(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Templates from the `[[autolinks]]` entries. Invalid entries are
    /// skipped with a warning; valid ones keep working.
    pub fn autolink_templates(&self) -> Vec<AutolinkTemplate> {
        self.autolinks
            .iter()
            .filter_map(|entry| match validate_entry(entry) {
                Ok(template) => Some(template),
                Err(e) => {
                    warn!(prefix = %entry.prefix, error = %e, "skipping autolink entry");
                    None
                }
            })
            .collect()
    }
}

fn validate_entry(entry: &AutolinkEntry) -> Result<AutolinkTemplate> {
    if entry.prefix.is_empty() {
        return Err(HostlinkError::Configuration(
            "autolink prefix must not be empty".to_string(),
        ));
    }
    if !entry.url.contains(ID_PLACEHOLDER) {
        return Err(HostlinkError::Configuration(format!(
            "autolink url must contain {ID_PLACEHOLDER}"
        )));
    }
    Ok(AutolinkTemplate {
        match_prefix: entry.prefix.clone(),
        url_template: entry.url.clone(),
        alphanumeric_id: entry.alphanumeric,
        case_insensitive: entry.ignore_case,
        title_template: entry.title.clone(),
        category: AutolinkCategory::Issue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostlink_core::ProviderKind;

    #[test]
    fn test_parse_full_config() {
        let config = HostlinkConfig::from_toml_str(
            r#"
            [[autolinks]]
            prefix = "JIRA-"
            url = "https://jira.example.com/browse/JIRA-<num>"
            title = "Jira issue <num>"
            alphanumeric = true
            ignore_case = true

            [[remotes]]
            domain = "git.example.com"
            type = "gitlab-self-hosted"
            name = "Example GitLab"
            "#,
        )
        .unwrap();

        let templates = config.autolink_templates();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].match_prefix, "JIRA-");
        assert!(templates[0].alphanumeric_id);
        assert!(templates[0].case_insensitive);
        assert_eq!(templates[0].title_template.as_deref(), Some("Jira issue <num>"));

        assert_eq!(config.remotes.len(), 1);
        assert_eq!(config.remotes[0].kind, ProviderKind::GitLabSelfHosted);
    }

    #[test]
    fn test_empty_document() {
        let config = HostlinkConfig::from_toml_str("").unwrap();
        assert!(config.autolinks.is_empty());
        assert!(config.remotes.is_empty());
    }

    #[test]
    fn test_entry_without_placeholder_is_skipped() {
        let config = HostlinkConfig::from_toml_str(
            r#"
            [[autolinks]]
            prefix = "BAD-"
            url = "https://example.com/issues"

            [[autolinks]]
            prefix = "GOOD-"
            url = "https://example.com/issues/<num>"
            "#,
        )
        .unwrap();

        let templates = config.autolink_templates();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].match_prefix, "GOOD-");
    }

    #[test]
    fn test_empty_prefix_is_skipped() {
        let config = HostlinkConfig::from_toml_str(
            r#"
            [[autolinks]]
            prefix = ""
            url = "https://example.com/<num>"
            "#,
        )
        .unwrap();
        assert!(config.autolink_templates().is_empty());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(HostlinkConfig::from_toml_str("[[autolinks").is_err());
    }
}
