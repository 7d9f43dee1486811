//! Domain models for hostlink.
//!
//! Canonical definitions for the core entities:
//! - `RemoteDescriptor`: parsed identity of a git remote
//! - `RemoteResource`: abstract "what URL do I want" request
//! - `AutolinkTemplate`: rule converting a text pattern into a hyperlink
//! - `IssueOrPullRequestResult` / `EnrichmentOutcome`: live reference data

pub mod autolink;
pub mod error;
pub mod issue;
pub mod remote;
pub mod resource;

pub use autolink::{AutolinkCategory, AutolinkTemplate, ID_PLACEHOLDER};
pub use error::{HostlinkError, Result};
pub use issue::{EnrichmentOutcome, IssueOrPullRequestResult, IssueState};
pub use remote::{RemoteDescriptor, RemoteProtocol};
pub use resource::{ComparisonNotation, LineRange, RemoteResource};
