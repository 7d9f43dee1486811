//! Remote resources: abstract "what URL do I want" requests, independent
//! of which hosting provider builds them.

use serde::{Deserialize, Serialize};

/// A line or line range within a file, 1-based.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl LineRange {
    pub fn single(line: u32) -> Self {
        Self { start: line, end: None }
    }

    pub fn span(start: u32, end: u32) -> Self {
        Self { start, end: Some(end) }
    }
}

/// Notation used for comparison URLs.
///
/// GitHub-style hosts distinguish `...` (merge base) from `..` (direct).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ComparisonNotation {
    #[serde(rename = "...")]
    TripleDot,
    #[serde(rename = "..")]
    DoubleDot,
}

impl ComparisonNotation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonNotation::TripleDot => "...",
            ComparisonNotation::DoubleDot => "..",
        }
    }
}

/// An abstract hosting resource to build a URL for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemoteResource {
    /// A single branch's history/landing page.
    Branch { name: String },

    /// The branch listing page.
    Branches,

    /// A single commit.
    Commit { sha: String },

    /// A comparison between two refs.
    Comparison {
        base: String,
        compare: String,
        notation: ComparisonNotation,
    },

    /// The "open a pull request" page for a branch.
    CreatePullRequest {
        base_branch: Option<String>,
        compare_branch: String,
    },

    /// A file at a movable ref (or the default view when no ref is given).
    File {
        path: String,
        branch_or_tag: Option<String>,
        range: Option<LineRange>,
    },

    /// The repository landing page.
    Repo,

    /// A file at a specific revision; `sha` wins over `branch_or_tag`.
    Revision {
        path: String,
        sha: Option<String>,
        branch_or_tag: Option<String>,
        range: Option<LineRange>,
    },
}
