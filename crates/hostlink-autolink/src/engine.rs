//! The autolink engine: scans text for references, rewrites them into
//! links, and collects numbered footnotes for enriched references.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::warn;

use hostlink_core::domain::{
    AutolinkTemplate, EnrichmentOutcome, IssueOrPullRequestResult, ID_PLACEHOLDER,
};
use hostlink_core::RemoteProvider;

use crate::compiled::TemplateCache;
use crate::dynamic::CrossRepoAutolink;

/// Output context for rendered references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    PlainText,
}

/// Numbered footnotes collected during one or more linkify calls.
///
/// Indices are 1-based, strictly increasing, and never reused for a
/// different key within the collection's lifetime. Repeated mentions of
/// the same key share one footnote.
#[derive(Debug, Default)]
pub struct Footnotes {
    entries: Vec<String>,
    index_by_key: HashMap<String, usize>,
}

impl Footnotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Index for `key`, inserting `text` as a new footnote on first use.
    fn index_for(&mut self, key: &str, text: String) -> usize {
        if let Some(&index) = self.index_by_key.get(key) {
            return index;
        }
        self.entries.push(text);
        let index = self.entries.len();
        self.index_by_key.insert(key.to_string(), index);
        index
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, text)| (i + 1, text.as_str()))
    }

    /// The footnote block: one line per footnote, prefixed by its
    /// superscript index.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (index, text) in self.iter() {
            out.push_str(&superscript(index));
            out.push(' ');
            out.push_str(text);
            out.push('\n');
        }
        out.pop();
        out
    }
}

/// Scans text against configured and provider-supplied autolink
/// templates and rewrites references into enriched links.
///
/// The compiled-pattern cache is owned here and survives across calls;
/// [`reload`](AutolinkEngine::reload) rebuilds it from scratch on
/// configuration change.
#[derive(Debug)]
pub struct AutolinkEngine {
    config_templates: Vec<AutolinkTemplate>,
    cache: TemplateCache,
    cross_repo: CrossRepoAutolink,
}

impl AutolinkEngine {
    pub fn new(config_templates: Vec<AutolinkTemplate>) -> Self {
        Self {
            config_templates,
            cache: TemplateCache::new(),
            cross_repo: CrossRepoAutolink::new(),
        }
    }

    /// Replace the configured templates and drop all compiled state.
    pub fn reload(&mut self, config_templates: Vec<AutolinkTemplate>) {
        self.config_templates = config_templates;
        self.cache = TemplateCache::new();
    }

    /// All live templates, configuration first, then each provider's,
    /// in provider order. This order drives footnote numbering.
    pub fn templates(&self, providers: &[RemoteProvider]) -> Vec<AutolinkTemplate> {
        let mut templates = self.config_templates.clone();
        for provider in providers {
            templates.extend(provider.autolink_templates());
        }
        templates
    }

    pub(crate) fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    pub(crate) fn cross_repo(&self) -> &CrossRepoAutolink {
        &self.cross_repo
    }

    /// Rewrite references in `text` into links, appending a footnote
    /// block when enrichment produced footnotes.
    pub fn linkify(
        &self,
        text: &str,
        format: OutputFormat,
        providers: &[RemoteProvider],
        resolved: Option<&HashMap<String, EnrichmentOutcome>>,
    ) -> String {
        let mut footnotes = Footnotes::new();
        let out = self.linkify_with_footnotes(text, format, providers, resolved, &mut footnotes);
        if footnotes.is_empty() {
            out
        } else {
            format!("{out}\n--\n{}", footnotes.render())
        }
    }

    /// Like [`linkify`](Self::linkify), but footnotes accumulate in the
    /// caller's collection and no footnote block is appended.
    pub fn linkify_with_footnotes(
        &self,
        text: &str,
        format: OutputFormat,
        providers: &[RemoteProvider],
        resolved: Option<&HashMap<String, EnrichmentOutcome>>,
        footnotes: &mut Footnotes,
    ) -> String {
        let markdown = format == OutputFormat::Markdown;

        // Every template matches against the original text; rewrites are
        // spliced in one pass at the end. A pattern therefore never sees
        // another template's rendered output, and overlapping matches go
        // to the earlier template.
        let mut splices: Vec<Splice> = Vec::new();

        for template in self.templates(providers) {
            if !template.url_template.contains(ID_PLACEHOLDER) {
                warn!(
                    prefix = %template.match_prefix,
                    url = %template.url_template,
                    "disabling autolink template without id placeholder"
                );
                self.cache.disable(&template);
                continue;
            }
            let Some(compiled) = self.cache.get_or_compile(&template) else {
                continue;
            };

            for caps in compiled.pattern(markdown).captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                let range = whole.range();
                if overlaps(&splices, &range) {
                    continue;
                }
                let anchor = &caps[1];
                let label = format!("{}{}", &caps[2], &caps[3]);
                let id = &caps[3];
                let outcome = resolved.and_then(|m| m.get(id));
                let url = match outcome {
                    Some(EnrichmentOutcome::Resolved(issue)) => issue.url.clone(),
                    _ => template.url_for(id),
                };
                let rendered = render_reference(
                    format,
                    &label,
                    id,
                    &url,
                    template.title_for(id).as_deref(),
                    outcome,
                    footnotes,
                );
                splices.push(Splice {
                    range,
                    rendered: format!("{anchor}{rendered}"),
                });
            }
        }

        for provider in providers {
            if !provider.supports_cross_repo_references() {
                continue;
            }
            for m in self.cross_repo.find(text, markdown) {
                if overlaps(&splices, &m.range) {
                    continue;
                }
                let key = m.reference.key();
                let outcome = resolved.and_then(|map| map.get(&key));
                let url = match outcome {
                    Some(EnrichmentOutcome::Resolved(issue)) => issue.url.clone(),
                    _ => self.cross_repo.url_for(provider, &m.reference),
                };
                let rendered =
                    render_reference(format, &m.text, &key, &url, None, outcome, footnotes);
                splices.push(Splice {
                    range: m.range.clone(),
                    rendered: format!("{}{}", m.anchor, rendered),
                });
            }
        }

        splices.sort_by_key(|s| s.range.start);
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for s in &splices {
            out.push_str(&text[last..s.range.start]);
            out.push_str(&s.rendered);
            last = s.range.end;
        }
        out.push_str(&text[last..]);
        out
    }
}

/// One pending rewrite of a span of the original text.
struct Splice {
    range: std::ops::Range<usize>,
    rendered: String,
}

fn overlaps(splices: &[Splice], range: &std::ops::Range<usize>) -> bool {
    splices
        .iter()
        .any(|s| range.start < s.range.end && s.range.start < range.end)
}

/// Render one reference occurrence, registering a footnote when the
/// outcome calls for one. `key` dedupes footnotes across mentions.
#[allow(clippy::too_many_arguments)]
fn render_reference(
    format: OutputFormat,
    label: &str,
    key: &str,
    url: &str,
    title: Option<&str>,
    outcome: Option<&EnrichmentOutcome>,
    footnotes: &mut Footnotes,
) -> String {
    match format {
        OutputFormat::Markdown => {
            let link = match outcome {
                Some(EnrichmentOutcome::Resolved(issue)) => {
                    let tooltip = issue_summary(issue);
                    format!("[{label}]({url} \"{}\")", escape_title(&tooltip))
                }
                _ => match title {
                    Some(title) => format!("[{label}]({url} \"{}\")", escape_title(title)),
                    None => format!("[{label}]({url})"),
                },
            };
            match outcome {
                Some(EnrichmentOutcome::Resolved(issue)) => {
                    let index = footnotes.index_for(key, issue_summary(issue));
                    format!("{link}{}", superscript(index))
                }
                Some(EnrichmentOutcome::TimedOut) => {
                    let index =
                        footnotes.index_for(key, format!("{label} details timed out"));
                    format!("{link}{}", superscript(index))
                }
                _ => link,
            }
        }
        OutputFormat::PlainText => {
            // Plain text cannot carry a link; the footnote does.
            let text = match outcome {
                Some(EnrichmentOutcome::Resolved(issue)) => {
                    format!("{} · {url}", issue_summary(issue))
                }
                Some(EnrichmentOutcome::TimedOut) => {
                    format!("{label} details timed out")
                }
                Some(EnrichmentOutcome::NotFound) | None => url.to_string(),
            };
            let index = footnotes.index_for(key, text);
            format!("{label}{}", superscript(index))
        }
    }
}

/// One-line summary of a resolved issue: title, state, relative age.
fn issue_summary(issue: &IssueOrPullRequestResult) -> String {
    let age_anchor = issue.closed_at.unwrap_or(issue.created_at);
    format!(
        "{} · {}, {}",
        issue.title,
        issue.state.as_str(),
        relative_age(age_anchor, Utc::now())
    )
}

fn escape_title(title: &str) -> String {
    title.replace('"', "\\\"")
}

/// Superscript form of a 1-based footnote index.
pub fn superscript(index: usize) -> String {
    const DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
    index
        .to_string()
        .chars()
        .map(|c| DIGITS[c.to_digit(10).expect("digit") as usize])
        .collect()
}

/// Coarse human-readable age, e.g. "3 days ago".
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - then).num_days();
    match days {
        i64::MIN..=0 => "today".to_string(),
        1 => "yesterday".to_string(),
        2..=29 => format!("{days} days ago"),
        30..=364 => {
            let months = days / 30;
            if months == 1 {
                "a month ago".to_string()
            } else {
                format!("{months} months ago")
            }
        }
        _ => {
            let years = days / 365;
            if years == 1 {
                "a year ago".to_string()
            } else {
                format!("{years} years ago")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use hostlink_core::domain::IssueState;

    fn template() -> AutolinkTemplate {
        AutolinkTemplate::issue("#", "https://github.com/o/r/issues/<num>")
    }

    fn engine() -> AutolinkEngine {
        AutolinkEngine::new(vec![template()])
    }

    #[test]
    fn test_bare_link_interpolates_exact_id() {
        let out = engine().linkify("Fixes #42", OutputFormat::Markdown, &[], None);
        assert_eq!(out, "Fixes [#42](https://github.com/o/r/issues/42)");
    }

    #[test]
    fn test_anchoring_skips_mid_word_prefix() {
        let out = engine().linkify("ref#42 stays", OutputFormat::Markdown, &[], None);
        assert_eq!(out, "ref#42 stays");
    }

    #[test]
    fn test_title_template_becomes_tooltip() {
        let mut t = template();
        t.title_template = Some("Open issue #<num>".to_string());
        let engine = AutolinkEngine::new(vec![t]);
        let out = engine.linkify("#7", OutputFormat::Markdown, &[], None);
        assert_eq!(
            out,
            "[#7](https://github.com/o/r/issues/7 \"Open issue #7\")"
        );
    }

    #[test]
    fn test_resolved_reference_gets_footnote() {
        let issue = IssueOrPullRequestResult {
            id: "42".to_string(),
            title: "Fix the frobnicator".to_string(),
            state: IssueState::Closed,
            created_at: Utc::now() - Duration::days(10),
            closed_at: Some(Utc::now() - Duration::days(3)),
            url: "https://github.com/o/r/issues/42".to_string(),
            is_pull_request: false,
        };
        let mut resolved = HashMap::new();
        resolved.insert("42".to_string(), EnrichmentOutcome::Resolved(issue));

        let out = engine().linkify("Fixes #42", OutputFormat::Markdown, &[], Some(&resolved));
        assert!(out.contains("[#42](https://github.com/o/r/issues/42"));
        assert!(out.contains("Fix the frobnicator · closed, 3 days ago"));
        assert!(out.contains('¹'));
        assert!(out.contains("\n--\n"));
    }

    #[test]
    fn test_repeated_mentions_share_one_footnote() {
        let mut resolved = HashMap::new();
        resolved.insert("5".to_string(), EnrichmentOutcome::TimedOut);

        let out = engine().linkify(
            "see #5 and again #5",
            OutputFormat::Markdown,
            &[],
            Some(&resolved),
        );
        assert_eq!(out.matches("¹ #5 details timed out").count(), 1);
        assert!(!out.contains('²'));
    }

    #[test]
    fn test_timed_out_renders_bare_link_with_footnote() {
        let mut resolved = HashMap::new();
        resolved.insert("9".to_string(), EnrichmentOutcome::TimedOut);

        let out = engine().linkify("#9", OutputFormat::Markdown, &[], Some(&resolved));
        assert!(out.starts_with("[#9](https://github.com/o/r/issues/9)¹"));
        assert!(out.contains("#9 details timed out"));
    }

    #[test]
    fn test_not_found_renders_bare_link_without_footnote() {
        let mut resolved = HashMap::new();
        resolved.insert("3".to_string(), EnrichmentOutcome::NotFound);

        let out = engine().linkify("#3", OutputFormat::Markdown, &[], Some(&resolved));
        assert_eq!(out, "[#3](https://github.com/o/r/issues/3)");
    }

    #[test]
    fn test_plain_text_uses_superscript_and_verbatim_footnote() {
        let out = engine().linkify("Fixes #42", OutputFormat::PlainText, &[], None);
        assert!(out.starts_with("Fixes #42¹"));
        assert!(out.contains("¹ https://github.com/o/r/issues/42"));
        assert!(!out.contains('['), "plain text must not inline links");
    }

    #[test]
    fn test_caller_owned_footnotes_suppress_assembly() {
        let engine = engine();
        let mut footnotes = Footnotes::new();
        let out = engine.linkify_with_footnotes(
            "Fixes #42",
            OutputFormat::PlainText,
            &[],
            None,
            &mut footnotes,
        );
        assert_eq!(out, "Fixes #42¹");
        assert_eq!(footnotes.len(), 1);
    }

    #[test]
    fn test_footnote_indices_continue_across_calls() {
        let engine = engine();
        let mut footnotes = Footnotes::new();
        engine.linkify_with_footnotes("#1", OutputFormat::PlainText, &[], None, &mut footnotes);
        let out =
            engine.linkify_with_footnotes("#2", OutputFormat::PlainText, &[], None, &mut footnotes);
        assert!(out.contains('²'));
        assert_eq!(footnotes.len(), 2);
    }

    #[test]
    fn test_template_without_placeholder_is_disabled_others_work() {
        let broken = AutolinkTemplate::issue("BAD-", "https://example.com/nothing");
        let engine = AutolinkEngine::new(vec![broken.clone(), template()]);

        let out = engine.linkify("BAD-1 and #2", OutputFormat::Markdown, &[], None);
        assert!(out.contains("BAD-1 and ["));
        assert!(!out.contains("example.com/nothing"));
        assert!(engine.cache().is_disabled(&broken));
    }

    #[test]
    fn test_markdown_escaped_input_matches() {
        let out = engine().linkify(r"Fixes \#42", OutputFormat::Markdown, &[], None);
        assert_eq!(out, r"Fixes [\#42](https://github.com/o/r/issues/42)");
    }

    #[test]
    fn test_superscript() {
        assert_eq!(superscript(1), "¹");
        assert_eq!(superscript(12), "¹²");
    }

    #[test]
    fn test_relative_age_buckets() {
        let now = Utc::now();
        assert_eq!(relative_age(now, now), "today");
        assert_eq!(relative_age(now - Duration::days(1), now), "yesterday");
        assert_eq!(relative_age(now - Duration::days(12), now), "12 days ago");
        assert_eq!(relative_age(now - Duration::days(40), now), "a month ago");
        assert_eq!(relative_age(now - Duration::days(800), now), "2 years ago");
    }
}
