//! Git integration: batched branch lookup against a local repository.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::{HostlinkError, Result};
use crate::reverse::LocalBranchLookup;

/// Branch lookup that shells out to `git for-each-ref`.
///
/// Local branches are compared by short name; remote-tracking branches
/// have their remote prefix (the first path segment) stripped, so
/// `origin/feature/login` matches the candidate `feature/login`.
#[derive(Debug, Clone)]
pub struct GitBranchLookup {
    repo_dir: PathBuf,
}

impl GitBranchLookup {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    /// List all branch short names, local and remote (prefix stripped).
    async fn list_branch_names(&self) -> Result<HashSet<String>> {
        let output = Command::new("git")
            .args([
                "for-each-ref",
                "--format=%(refname:short)",
                "refs/heads",
                "refs/remotes",
            ])
            .current_dir(&self.repo_dir)
            .output()
            .await
            .map_err(|e| HostlinkError::Git(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HostlinkError::Git(format!(
                "git for-each-ref failed: {stderr}"
            )));
        }

        let mut names = HashSet::new();
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            let name = line.trim();
            if name.is_empty() {
                continue;
            }
            names.insert(name.to_string());
            // Remote-tracking refs also count under their stripped name.
            if let Some((_, stripped)) = name.split_once('/') {
                if !stripped.is_empty() && stripped != "HEAD" {
                    names.insert(stripped.to_string());
                }
            }
        }
        Ok(names)
    }
}

#[async_trait]
impl LocalBranchLookup for GitBranchLookup {
    async fn branches_matching(&self, candidates: &[String]) -> Result<Vec<String>> {
        let names = self.list_branch_names().await?;
        let matched: Vec<String> = candidates
            .iter()
            .filter(|c| names.contains(*c))
            .cloned()
            .collect();
        debug!(
            candidates = candidates.len(),
            matched = matched.len(),
            "batched branch lookup"
        );
        Ok(matched)
    }
}

/// Check whether a directory is inside a git work tree.
pub fn is_git_repo(dir: &Path) -> bool {
    std::process::Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
