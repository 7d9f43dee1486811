//! Compiled autolink templates and the engine-owned pattern cache.
//!
//! Detection patterns are compiled once per template fingerprint and
//! reused. The cache is owned by the engine (not stashed on shared
//! template objects) so ownership under concurrent reads is unambiguous:
//! entries are written exactly once and only read afterwards.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use regex::Regex;
use tracing::warn;

use hostlink_core::domain::{AutolinkTemplate, HostlinkError, Result};

/// A template plus its compiled detection patterns.
///
/// `plain` matches raw text; `markdown` matches text whose prefix has
/// already been markdown-escaped (e.g. `\#42`).
#[derive(Debug)]
pub struct CompiledAutolinkTemplate {
    pub template: AutolinkTemplate,
    plain: Regex,
    markdown: Regex,
}

impl CompiledAutolinkTemplate {
    /// Compile both pattern variants for a template.
    pub fn compile(template: &AutolinkTemplate) -> Result<Self> {
        let raw = regex::escape(&template.match_prefix);
        let escaped = regex::escape(&escape_markdown(&template.match_prefix));
        let plain = build_pattern(&raw, template)?;
        // Markdown text may carry the prefix escaped or raw.
        let markdown_source = if escaped == raw {
            raw
        } else {
            format!("(?:{escaped})|(?:{raw})")
        };
        let markdown = build_pattern(&markdown_source, template)?;
        Ok(Self {
            template: template.clone(),
            plain,
            markdown,
        })
    }

    /// The detection pattern for the given context.
    ///
    /// Capture groups: 1 = anchor, 2 = matched prefix, 3 = id.
    pub fn pattern(&self, markdown: bool) -> &Regex {
        if markdown {
            &self.markdown
        } else {
            &self.plain
        }
    }
}

/// Matches are anchored to start-of-text, whitespace, `(`, or an
/// escaped `[`; the anchor is captured so replacements can re-emit it.
/// `prefix_source` must already be regex-escaped.
fn build_pattern(prefix_source: &str, template: &AutolinkTemplate) -> Result<Regex> {
    let id_class = if template.alphanumeric_id {
        "[A-Za-z0-9_]+"
    } else {
        "[0-9]+"
    };
    let flags = if template.case_insensitive { "(?i)" } else { "" };
    let source = format!(r"{flags}(^|\s|\(|\\\[)({prefix_source})({id_class})");
    Regex::new(&source).map_err(|source| HostlinkError::PatternCompile {
        prefix: template.match_prefix.clone(),
        source,
    })
}

/// Escape markdown-significant characters the way rendered markdown
/// escapes them, so patterns can match inside already-escaped text.
pub fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(
            c,
            '\\' | '`' | '*' | '_' | '{' | '}' | '[' | ']' | '(' | ')' | '#' | '+' | '-' | '.'
                | '!' | '<' | '>'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Engine-owned cache of compiled templates, keyed by fingerprint.
///
/// A template whose pattern fails to compile is disabled for the
/// lifetime of the cache; other templates keep functioning.
#[derive(Debug, Default)]
pub struct TemplateCache {
    compiled: RwLock<HashMap<String, Arc<CompiledAutolinkTemplate>>>,
    disabled: RwLock<HashSet<String>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the compiled form of a template, compiling on first use.
    ///
    /// Returns `None` for templates disabled by an earlier failure.
    pub fn get_or_compile(
        &self,
        template: &AutolinkTemplate,
    ) -> Option<Arc<CompiledAutolinkTemplate>> {
        let fingerprint = template.fingerprint();

        if self.disabled.read().unwrap().contains(&fingerprint) {
            return None;
        }
        if let Some(compiled) = self.compiled.read().unwrap().get(&fingerprint) {
            return Some(Arc::clone(compiled));
        }

        match CompiledAutolinkTemplate::compile(template) {
            Ok(compiled) => {
                let compiled = Arc::new(compiled);
                let mut map = self.compiled.write().unwrap();
                let entry = map
                    .entry(fingerprint)
                    .or_insert_with(|| Arc::clone(&compiled));
                Some(Arc::clone(entry))
            }
            Err(e) => {
                warn!(
                    prefix = %template.match_prefix,
                    url = %template.url_template,
                    error = %e,
                    "disabling autolink template"
                );
                self.disabled.write().unwrap().insert(fingerprint);
                None
            }
        }
    }

    /// Disable a template for the remainder of this cache's lifetime.
    pub fn disable(&self, template: &AutolinkTemplate) {
        self.disabled
            .write()
            .unwrap()
            .insert(template.fingerprint());
    }

    pub fn is_disabled(&self, template: &AutolinkTemplate) -> bool {
        self.disabled
            .read()
            .unwrap()
            .contains(&template.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(prefix: &str) -> AutolinkTemplate {
        AutolinkTemplate::issue(prefix, "https://example.com/issues/<num>")
    }

    #[test]
    fn test_pattern_anchoring() {
        let compiled = CompiledAutolinkTemplate::compile(&template("#")).unwrap();
        let re = compiled.pattern(false);

        assert!(re.is_match("#42"));
        assert!(re.is_match("fixes #42"));
        assert!(re.is_match("(#42)"));
        assert!(re.is_match(r"\[#42"));
        // No anchor: mid-word occurrences must not match.
        assert!(!re.is_match("issue#42"));
        assert!(!re.is_match("x#42"));
    }

    #[test]
    fn test_markdown_variant_matches_escaped_and_raw_prefix() {
        let compiled = CompiledAutolinkTemplate::compile(&template("#")).unwrap();
        assert!(compiled.pattern(true).is_match(r"fixes \#42"));
        assert!(compiled.pattern(true).is_match("fixes #42"));
        // The plain variant must not swallow the escape backslash.
        let caps = compiled.pattern(true).captures(r"fixes \#42").unwrap();
        assert_eq!(&caps[2], r"\#");
    }

    #[test]
    fn test_alphanumeric_and_case_insensitive_ids() {
        let mut t = template("JIRA-");
        t.alphanumeric_id = true;
        t.case_insensitive = true;
        let compiled = CompiledAutolinkTemplate::compile(&t).unwrap();
        let re = compiled.pattern(false);

        let caps = re.captures("see jira-ABC42x").unwrap();
        assert_eq!(&caps[2], "jira-");
        assert_eq!(&caps[3], "ABC42x");
    }

    #[test]
    fn test_numeric_template_rejects_alpha_ids() {
        let compiled = CompiledAutolinkTemplate::compile(&template("#")).unwrap();
        assert!(!compiled.pattern(false).is_match("#abc"));
    }

    #[test]
    fn test_regex_metacharacters_in_prefix_are_escaped() {
        let compiled = CompiledAutolinkTemplate::compile(&template("BUG(")).unwrap();
        assert!(compiled.pattern(false).is_match("BUG(42"));
        assert!(!compiled.pattern(false).is_match("BUGX42"));
    }

    #[test]
    fn test_cache_compiles_once_and_reuses() {
        let cache = TemplateCache::new();
        let t = template("#");
        let a = cache.get_or_compile(&t).unwrap();
        let b = cache.get_or_compile(&t).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_disabled_template_stays_disabled() {
        let cache = TemplateCache::new();
        let t = template("#");
        cache.disable(&t);
        assert!(cache.get_or_compile(&t).is_none());
        assert!(cache.is_disabled(&t));

        // Other templates keep functioning.
        assert!(cache.get_or_compile(&template("GH-")).is_some());
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("#"), r"\#");
        assert_eq!(escape_markdown("issue #"), r"issue \#");
        assert_eq!(escape_markdown("plain"), "plain");
    }
}
