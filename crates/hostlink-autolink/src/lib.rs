//! Autolink detection, rendering, and enrichment.
//!
//! Turns issue/PR references in free text (`#42`, `JIRA-1001`,
//! `owner/repo#7`) into links, optionally enriched with live metadata
//! from the hosting service under a time budget.

pub mod compiled;
pub mod config;
pub mod dynamic;
pub mod engine;
pub mod enrich;
pub mod fakes;
pub mod github_client;

pub use compiled::{CompiledAutolinkTemplate, TemplateCache};
pub use config::{AutolinkEntry, HostlinkConfig};
pub use dynamic::{CrossRepoAutolink, DynamicMatch, DynamicRef};
pub use engine::{AutolinkEngine, Footnotes, OutputFormat};
pub use enrich::{EnrichmentCoordinator, HostingClient};
pub use github_client::GitHubHostingClient;
