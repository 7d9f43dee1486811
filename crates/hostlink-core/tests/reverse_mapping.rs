//! Integration tests for reverse URL mapping and build/parse round-trips.

use hostlink_core::fakes::MemoryBranchLookup;
use hostlink_core::{
    LineRange, ProviderKind, ProviderRegistry, RemoteDescriptor, RemoteProvider, RemoteResource,
};

fn provider(kind: ProviderKind, domain: &str, path: &str) -> RemoteProvider {
    RemoteProvider::new(kind, RemoteDescriptor::new(domain, path))
}

const SHA: &str = "0123456789abcdef0123456789abcdef01234567";

/// Building a permalink then parsing it back must recover the same
/// path and line range, without touching the branch lookup.
#[tokio::test]
async fn test_permalink_round_trip_github() {
    let p = provider(ProviderKind::GitHub, "github.com", "owner/repo");
    let url = p
        .build_url(&RemoteResource::Revision {
            path: "src/app.ts".to_string(),
            sha: Some(SHA.to_string()),
            branch_or_tag: None,
            range: Some(LineRange::span(10, 20)),
        })
        .unwrap();

    let branches = MemoryBranchLookup::new(&[]);
    let info = p.parse_local_info(&url, &branches).await.unwrap().unwrap();
    assert_eq!(info.path, "src/app.ts");
    assert_eq!(info.start_line, Some(10));
    assert_eq!(info.end_line, Some(20));
    assert_eq!(branches.query_count(), 0);
}

#[tokio::test]
async fn test_permalink_round_trip_gitlab_and_bitbucket() {
    for (kind, domain) in [
        (ProviderKind::GitLab, "gitlab.com"),
        (ProviderKind::BitbucketCloud, "bitbucket.org"),
    ] {
        let p = provider(kind, domain, "owner/repo");
        let url = p
            .build_url(&RemoteResource::Revision {
                path: "docs/guide.md".to_string(),
                sha: Some(SHA.to_string()),
                branch_or_tag: None,
                range: Some(LineRange::single(7)),
            })
            .unwrap();

        let branches = MemoryBranchLookup::new(&[]);
        let info = p.parse_local_info(&url, &branches).await.unwrap().unwrap();
        assert_eq!(info.path, "docs/guide.md", "provider {:?}", kind);
        assert_eq!(info.start_line, Some(7), "provider {:?}", kind);
    }
}

/// Branch names containing `/` cannot be split by position; the lookup
/// disambiguates. `feature/login` must win over `feature`.
#[tokio::test]
async fn test_slash_branch_url_resolves_correct_path() {
    let p = provider(ProviderKind::GitHub, "github.com", "owner/repo");
    let branches = MemoryBranchLookup::new(&["main", "feature", "feature/login"]);

    let info = p
        .parse_local_info(
            "https://github.com/owner/repo/blob/feature/login/src/app.ts#L10-L20",
            &branches,
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(info.path, "src/app.ts");
    assert_eq!(info.start_line, Some(10));
    assert_eq!(info.end_line, Some(20));
    assert_eq!(branches.query_count(), 1);
}

#[tokio::test]
async fn test_branch_round_trip_with_lookup() {
    let p = provider(ProviderKind::GitLab, "gitlab.com", "group/project");
    let url = p
        .build_url(&RemoteResource::File {
            path: "src/main.rs".to_string(),
            branch_or_tag: Some("release/v2".to_string()),
            range: Some(LineRange::span(3, 5)),
        })
        .unwrap();

    let branches = MemoryBranchLookup::new(&["main", "release/v2"]);
    let info = p.parse_local_info(&url, &branches).await.unwrap().unwrap();
    assert_eq!(info.path, "src/main.rs");
    assert_eq!(info.start_line, Some(3));
    assert_eq!(info.end_line, Some(5));
}

#[tokio::test]
async fn test_bitbucket_server_scm_remote_round_trip() {
    let registry = ProviderRegistry::new();
    let p = registry
        .resolve(
            "https://bitbucket.example.com/scm/PROJ/repo",
            "bitbucket.example.com",
            "scm/PROJ/repo",
        )
        .unwrap();
    assert_eq!(p.kind(), ProviderKind::BitbucketServer);
    assert_eq!(
        p.base_url(),
        "https://bitbucket.example.com/projects/PROJ/repos/repo"
    );

    let url = p
        .build_url(&RemoteResource::Revision {
            path: "src/app.ts".to_string(),
            sha: Some(SHA.to_string()),
            branch_or_tag: None,
            range: Some(LineRange::span(10, 20)),
        })
        .unwrap();
    assert_eq!(
        url,
        format!("https://bitbucket.example.com/projects/PROJ/repos/repo/browse/src/app.ts?at={SHA}#10-20")
    );

    let branches = MemoryBranchLookup::new(&[]);
    let info = p.parse_local_info(&url, &branches).await.unwrap().unwrap();
    assert_eq!(info.path, "src/app.ts");
    assert_eq!(info.start_line, Some(10));
    assert_eq!(info.end_line, Some(20));
}

#[tokio::test]
async fn test_azure_round_trip() {
    let p = provider(
        ProviderKind::AzureDevOps,
        "dev.azure.com",
        "org/project/_git/repo",
    );
    let url = p
        .build_url(&RemoteResource::Revision {
            path: "src/Program.cs".to_string(),
            sha: Some(SHA.to_string()),
            branch_or_tag: None,
            range: Some(LineRange::span(2, 4)),
        })
        .unwrap();

    let branches = MemoryBranchLookup::new(&[]);
    let info = p.parse_local_info(&url, &branches).await.unwrap().unwrap();
    assert_eq!(info.path, "src/Program.cs");
    assert_eq!(info.start_line, Some(2));
    assert_eq!(info.end_line, Some(4));
}

/// A pasted URL for another repository whose owner segment carries a
/// multi-byte character near the repo-base boundary is rejected cleanly.
#[tokio::test]
async fn test_multibyte_owner_url_is_rejected() {
    let p = provider(ProviderKind::GitHub, "github.com", "owner/repo");
    let branches = MemoryBranchLookup::new(&["main"]);
    let info = p
        .parse_local_info("https://github.com/abcdefghié/x/blob/main/a.rs", &branches)
        .await
        .unwrap();
    assert!(info.is_none());
}

#[tokio::test]
async fn test_foreign_url_is_rejected() {
    let p = provider(ProviderKind::GitHub, "github.com", "owner/repo");
    let branches = MemoryBranchLookup::new(&["main"]);
    let info = p
        .parse_local_info("https://gitlab.com/owner/repo/-/blob/main/a.rs", &branches)
        .await
        .unwrap();
    assert!(info.is_none());
}
