//! hostlink - reference resolution for git hosting services
//!
//! ## Commands
//!
//! - `url`: Build the web URL for a repository resource
//! - `parse`: Map a web URL back to a local file and line range
//! - `linkify`: Rewrite issue/PR references in text into links
//! - `resolve`: Resolve referenced ids against the hosting service
//! - `remotes`: Show which provider a remote URL resolves to

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, Level};

use hostlink_autolink::{
    AutolinkEngine, EnrichmentCoordinator, GitHubHostingClient, HostlinkConfig, OutputFormat,
};
use hostlink_core::domain::{ComparisonNotation, LineRange, RemoteResource};
use hostlink_core::{GitBranchLookup, ProviderRegistry, RemoteDescriptor, RemoteProvider};

#[derive(Parser)]
#[command(name = "hostlink")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reference resolution for git hosting services", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Path to a hostlink config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the web URL for a repository resource
    Url {
        /// Remote URL (any git form: https, ssh, scp-like)
        #[arg(short, long)]
        remote: String,

        #[command(subcommand)]
        resource: ResourceCommand,
    },

    /// Map a hosting web URL back to a local file and line range
    Parse {
        /// Remote URL the web URL belongs to
        #[arg(short, long)]
        remote: String,

        /// The web URL to parse
        url: String,

        /// Local repository used to disambiguate branch names
        /// (default: current directory)
        #[arg(long)]
        repo: Option<PathBuf>,
    },

    /// Rewrite issue/PR references in text into links
    Linkify {
        /// Remote URL defining the provider context
        #[arg(short, long)]
        remote: String,

        /// Text to linkify (reads stdin when omitted)
        text: Option<String>,

        /// Emit plain text with footnoted URLs instead of markdown
        #[arg(long)]
        plain: bool,

        /// Fetch live issue/PR metadata from the hosting service
        #[arg(long)]
        enrich: bool,

        /// Budget for metadata fetches, in milliseconds (0 waits for all)
        #[arg(long, default_value = "1500")]
        timeout_ms: u64,

        /// API token for the hosting service
        #[arg(long, env = "HOSTLINK_TOKEN")]
        token: Option<String>,

        /// API base URL override (for GitHub Enterprise)
        #[arg(long)]
        api_base: Option<String>,
    },

    /// Resolve referenced ids against the hosting service, as JSON
    Resolve {
        /// Remote URL defining the provider context
        #[arg(short, long)]
        remote: String,

        /// Text containing references (reads stdin when omitted)
        text: Option<String>,

        /// Budget for metadata fetches, in milliseconds (0 waits for all)
        #[arg(long, default_value = "1500")]
        timeout_ms: u64,

        /// API token for the hosting service
        #[arg(long, env = "HOSTLINK_TOKEN")]
        token: Option<String>,

        /// API base URL override (for GitHub Enterprise)
        #[arg(long)]
        api_base: Option<String>,
    },

    /// Show which provider a remote URL resolves to
    Remotes {
        /// Remote URLs to inspect
        remotes: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ResourceCommand {
    /// The repository landing page
    Repo,

    /// The branch listing page
    Branches,

    /// A single branch's history
    Branch {
        /// Branch name
        name: String,
    },

    /// A single commit
    Commit {
        /// Commit sha
        sha: String,
    },

    /// A file, optionally at a ref and line range
    File {
        /// Repository-relative path
        path: String,

        /// Branch or tag to pin the view to
        #[arg(long)]
        rev: Option<String>,

        /// Commit sha for a permalink (wins over --rev)
        #[arg(long)]
        sha: Option<String>,

        /// 1-based start line
        #[arg(short, long)]
        line: Option<u32>,

        /// 1-based end line (requires --line)
        #[arg(short, long)]
        end: Option<u32>,
    },

    /// A comparison between two refs
    Compare {
        /// Base ref
        base: String,

        /// Ref to compare against the base
        compare: String,

        /// Use direct `..` comparison instead of merge-base `...`
        #[arg(long)]
        direct: bool,
    },

    /// The "open a pull request" page for a branch
    Pr {
        /// Branch to open the pull request from
        compare: String,

        /// Target branch (service default when omitted)
        #[arg(long)]
        base: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    hostlink_core::init_tracing(cli.json, level);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Url { remote, resource } => cmd_url(&config, &remote, resource),
        Commands::Parse { remote, url, repo } => {
            cmd_parse(&config, &remote, &url, repo.as_deref()).await
        }
        Commands::Linkify {
            remote,
            text,
            plain,
            enrich,
            timeout_ms,
            token,
            api_base,
        } => {
            let text = read_text(text)?;
            cmd_linkify(
                &config,
                &remote,
                &text,
                plain,
                enrich,
                timeout_ms,
                token.as_deref(),
                api_base.as_deref(),
            )
            .await
        }
        Commands::Resolve {
            remote,
            text,
            timeout_ms,
            token,
            api_base,
        } => {
            let text = read_text(text)?;
            cmd_resolve(
                &config,
                &remote,
                &text,
                timeout_ms,
                token.as_deref(),
                api_base.as_deref(),
            )
            .await
        }
        Commands::Remotes { remotes } => cmd_remotes(&config, &remotes),
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<HostlinkConfig> {
    match path {
        Some(path) => HostlinkConfig::load(path)
            .with_context(|| format!("failed to load config: {:?}", path)),
        None => Ok(HostlinkConfig::default()),
    }
}

/// Resolve a remote URL to its provider through the registry.
fn provider_for(config: &HostlinkConfig, remote: &str) -> Result<RemoteProvider> {
    let descriptor = RemoteDescriptor::from_git_url(remote)
        .with_context(|| format!("not a recognizable git remote URL: {}", remote))?;
    let registry = ProviderRegistry::with_user_entries(&config.remotes);
    registry
        .resolve_descriptor(&descriptor)
        .with_context(|| format!("no provider matches remote: {}", remote))
}

fn read_text(arg: Option<String>) -> Result<String> {
    match arg {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read text from stdin")?;
            Ok(buf.trim_end().to_string())
        }
    }
}

fn budget(timeout_ms: u64) -> Option<Duration> {
    (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms))
}

fn hosting_client(
    token: Option<&str>,
    api_base: Option<&str>,
) -> Result<Arc<GitHubHostingClient>> {
    let mut client = match api_base {
        Some(base) => GitHubHostingClient::with_api_base(base)?,
        None => GitHubHostingClient::new()?,
    };
    if let Some(token) = token {
        client = client.with_token(token);
    }
    Ok(Arc::new(client))
}

fn resource_from_command(resource: ResourceCommand) -> Result<RemoteResource> {
    Ok(match resource {
        ResourceCommand::Repo => RemoteResource::Repo,
        ResourceCommand::Branches => RemoteResource::Branches,
        ResourceCommand::Branch { name } => RemoteResource::Branch { name },
        ResourceCommand::Commit { sha } => RemoteResource::Commit { sha },
        ResourceCommand::File {
            path,
            rev,
            sha,
            line,
            end,
        } => {
            let range = match (line, end) {
                (Some(start), Some(end)) => Some(LineRange::span(start, end)),
                (Some(start), None) => Some(LineRange::single(start)),
                (None, Some(_)) => bail!("--end requires --line"),
                (None, None) => None,
            };
            if sha.is_some() {
                RemoteResource::Revision {
                    path,
                    sha,
                    branch_or_tag: rev,
                    range,
                }
            } else {
                RemoteResource::File {
                    path,
                    branch_or_tag: rev,
                    range,
                }
            }
        }
        ResourceCommand::Compare {
            base,
            compare,
            direct,
        } => RemoteResource::Comparison {
            base,
            compare,
            notation: if direct {
                ComparisonNotation::DoubleDot
            } else {
                ComparisonNotation::TripleDot
            },
        },
        ResourceCommand::Pr { compare, base } => RemoteResource::CreatePullRequest {
            base_branch: base,
            compare_branch: compare,
        },
    })
}

/// Build the web URL for a repository resource
fn cmd_url(config: &HostlinkConfig, remote: &str, resource: ResourceCommand) -> Result<()> {
    let provider = provider_for(config, remote)?;
    let resource = resource_from_command(resource)?;
    debug!(provider = provider.id(), ?resource, "building url");

    match provider.build_url(&resource) {
        Some(url) => {
            println!("{}", url);
            Ok(())
        }
        None => bail!(
            "{} has no URL for this resource kind",
            provider.display_name()
        ),
    }
}

/// Map a hosting web URL back to a local file and line range
async fn cmd_parse(
    config: &HostlinkConfig,
    remote: &str,
    url: &str,
    repo: Option<&std::path::Path>,
) -> Result<()> {
    let provider = provider_for(config, remote)?;
    let repo_dir = match repo {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    if !hostlink_core::is_git_repo(&repo_dir) {
        bail!("not a git repository: {:?}", repo_dir);
    }

    let lookup = GitBranchLookup::new(&repo_dir);
    let info = provider
        .parse_local_info(url, &lookup)
        .await
        .context("failed to parse URL")?;

    match info {
        Some(info) => {
            let location = match (info.start_line, info.end_line) {
                (Some(start), Some(end)) => format!("{}:{}-{}", info.path, start, end),
                (Some(start), None) => format!("{}:{}", info.path, start),
                _ => info.path.clone(),
            };
            println!("{}", location);
            Ok(())
        }
        None => bail!(
            "URL does not belong to {} ({})",
            provider.display_name(),
            remote
        ),
    }
}

/// Rewrite issue/PR references in text into links
#[allow(clippy::too_many_arguments)]
async fn cmd_linkify(
    config: &HostlinkConfig,
    remote: &str,
    text: &str,
    plain: bool,
    enrich: bool,
    timeout_ms: u64,
    token: Option<&str>,
    api_base: Option<&str>,
) -> Result<()> {
    let provider = provider_for(config, remote)?;
    let engine = AutolinkEngine::new(config.autolink_templates());
    let providers = [provider];

    let resolved = if enrich {
        let coordinator = EnrichmentCoordinator::new(hosting_client(token, api_base)?);
        coordinator
            .resolve_referenced_ids(text, &providers[0], &engine, budget(timeout_ms))
            .await
    } else {
        None
    };

    let format = if plain {
        OutputFormat::PlainText
    } else {
        OutputFormat::Markdown
    };
    println!("{}", engine.linkify(text, format, &providers, resolved.as_ref()));
    Ok(())
}

/// Resolve referenced ids against the hosting service, as JSON
async fn cmd_resolve(
    config: &HostlinkConfig,
    remote: &str,
    text: &str,
    timeout_ms: u64,
    token: Option<&str>,
    api_base: Option<&str>,
) -> Result<()> {
    let provider = provider_for(config, remote)?;
    let engine = AutolinkEngine::new(config.autolink_templates());
    let coordinator = EnrichmentCoordinator::new(hosting_client(token, api_base)?);

    let outcomes = coordinator
        .resolve_referenced_ids(text, &provider, &engine, budget(timeout_ms))
        .await
        .unwrap_or_default();

    println!("{}", serde_json::to_string_pretty(&outcomes)?);
    Ok(())
}

/// Show which provider each remote URL resolves to
fn cmd_remotes(config: &HostlinkConfig, remotes: &[String]) -> Result<()> {
    let registry = ProviderRegistry::with_user_entries(&config.remotes);

    for remote in remotes {
        match RemoteDescriptor::from_git_url(remote) {
            Some(descriptor) => match registry.resolve_descriptor(&descriptor) {
                Some(provider) => println!(
                    "{} -> {} ({})",
                    remote,
                    provider.display_name(),
                    provider.base_url()
                ),
                None => println!("{} -> no matching provider", remote),
            },
            None => println!("{} -> not a git remote URL", remote),
        }
    }
    Ok(())
}
