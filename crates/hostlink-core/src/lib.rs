//! Hostlink Core Library
//!
//! Remote host providers for git hosting services: a registry mapping
//! remote URLs to provider variants, canonical URL builders for abstract
//! resources, and reverse mapping from pasted hosting URLs back to local
//! files and line ranges.

pub mod domain;
pub mod fakes;
pub mod git;
pub mod provider;
pub mod registry;
pub mod reverse;
pub mod telemetry;

pub use domain::{
    AutolinkCategory, AutolinkTemplate, ComparisonNotation, EnrichmentOutcome, HostlinkError,
    IssueOrPullRequestResult, IssueState, LineRange, RemoteDescriptor, RemoteProtocol,
    RemoteResource, Result, ID_PLACEHOLDER,
};

pub use provider::{CustomUrls, ProviderKind, RemoteProvider};

pub use registry::{ProviderRegistry, UserRemoteEntry};

pub use reverse::{LocalBranchLookup, LocalFileInfo};

pub use git::{is_git_repo, GitBranchLookup};

pub use telemetry::init_tracing;

/// Hostlink version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
