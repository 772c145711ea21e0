//! Integration tests for the registry facade over real HTTP.
//!
//! Each test starts a mockito server that behaves like a v1-only, v2-only or
//! mixed registry and drives `RegistryApi` with the reqwest transport.

use std::collections::HashSet;

use mockito::{Matcher, Mock, ServerGuard};

use dockside_registry::{RegistryApi, RegistryConfig, RegistryError, Repository, SearchResponse};

/// Mock registry; the mocks must be kept alive or the server answers 501.
struct RegistryMock {
    server: ServerGuard,
    #[allow(dead_code)]
    mocks: Vec<Mock>,
}

impl RegistryMock {
    async fn new() -> Self {
        Self {
            server: mockito::Server::new_async().await,
            mocks: Vec::new(),
        }
    }

    async fn json(mut self, path: &str, status: usize, body: &str) -> Self {
        let mock = self
            .server
            .mock("GET", path)
            .with_status(status)
            .with_header("Content-Type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    async fn search(mut self, query: &str, body: &str) -> Self {
        let mock = self
            .server
            .mock("GET", "/v1/search")
            .match_query(Matcher::UrlEncoded("q".into(), query.into()))
            .with_status(200)
            .with_header("Content-Type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    /// A v2-only registry: catalog, tag lists and `{}` at the root.
    async fn v2(self, repositories: &[&str], tags: &[(&str, Vec<&str>)]) -> Self {
        let catalog = serde_json::json!({ "repositories": repositories }).to_string();
        let mut registry = self
            .json("/v2/", 200, "{}")
            .await
            .json("/v2/_catalog", 200, &catalog)
            .await;

        for (image, image_tags) in tags {
            let body = serde_json::json!({ "name": image, "tags": image_tags }).to_string();
            registry = registry
                .json(&format!("/v2/{image}/tags/list"), 200, &body)
                .await;
        }
        registry
    }

    fn api(&self) -> RegistryApi {
        RegistryApi::new(RegistryConfig::new(self.server.url()))
    }
}

// =============================================================================
// v2-only registry
// =============================================================================

#[tokio::test]
async fn test_v2_registry_search_uses_catalog() {
    let registry = RegistryMock::new()
        .await
        .v2(&["nginx", "nginx-alpine", "redis"], &[])
        .await;

    let response = registry.api().search("nginx").await.unwrap();
    assert_eq!(
        response.results().unwrap().results,
        vec![Repository::new("nginx"), Repository::new("nginx-alpine")]
    );
}

#[tokio::test]
async fn test_v2_registry_tags() {
    let registry = RegistryMock::new()
        .await
        .v2(&["library/nginx"], &[("library/nginx", vec!["latest", "1.25", "1.24"])])
        .await;
    let api = registry.api();

    let tags = api.tags("library/nginx", None).await.unwrap();
    let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["latest", "1.25", "1.24"]);

    let filtered = api.tags("library/nginx", Some("1.2")).await.unwrap();
    assert_eq!(filtered.len(), 2);
}

#[tokio::test]
async fn test_v2_registry_unknown_repository() {
    let registry = RegistryMock::new()
        .await
        .v2(&[], &[])
        .await
        .json("/v2/ghost/tags/list", 404, r#"{"errors": [{"code": "NAME_UNKNOWN"}]}"#)
        .await;

    assert!(registry.api().tags("ghost", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_v2_registry_ok() {
    let registry = RegistryMock::new().await.v2(&[], &[]).await;
    assert!(registry.api().ok().await);
}

// =============================================================================
// v1 registry
// =============================================================================

#[tokio::test]
async fn test_v1_registry() {
    let registry = RegistryMock::new()
        .await
        .json("/v1/", 200, "\"Docker Registry API version 0.6.8\"")
        .await
        .search(
            "busy",
            r#"{"num_results": 1, "query": "busy", "results": [{"name": "library/busybox", "description": ""}]}"#,
        )
        .await
        .json(
            "/v1/repositories/library/busybox/tags",
            200,
            r#"{"latest": "5b0d59026729", "1.36": "a416a98b71e2"}"#,
        )
        .await;
    let api = registry.api();

    assert!(api.ok().await);

    let response = api.search("busy").await.unwrap();
    assert_eq!(response.results().unwrap().results[0].name, "library/busybox");

    let tags: HashSet<_> = api
        .tags("library/busybox", None)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(
        tags,
        HashSet::from(["latest".to_string(), "1.36".to_string()])
    );
}

#[tokio::test]
async fn test_v1_search_non_json_is_passed_through() {
    let registry = RegistryMock::new()
        .await
        .search("nginx", "search temporarily disabled")
        .await;

    let response = registry.api().search("nginx").await.unwrap();
    assert_eq!(
        response,
        SearchResponse::Raw("search temporarily disabled".to_string())
    );
}

#[tokio::test]
async fn test_v1_search_other_json_needs_no_catalog() {
    let registry = RegistryMock::new()
        .await
        .search("nginx", r#"{"num_results": 0}"#)
        .await
        .json("/v2/_catalog", 404, "{}")
        .await;

    let response = registry.api().search("nginx").await.unwrap();
    assert_eq!(
        response,
        SearchResponse::Json(serde_json::json!({"num_results": 0}))
    );
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_nothing_supported() {
    let registry = RegistryMock::new().await;
    let api = registry.api();

    assert!(!api.ok().await);
    assert!(api.search("nginx").await.is_err());
    assert!(matches!(
        api.tags("nginx", None).await,
        Err(RegistryError::HttpError { status: 501, .. })
    ));
}

#[tokio::test]
async fn test_unreachable_registry() {
    let api = RegistryApi::new(RegistryConfig::new("http://127.0.0.1:1"));

    assert!(!api.ok().await);
    let err = api.catalog("").await.unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_invalid_url_surfaces_on_first_request() {
    let api = RegistryApi::new(RegistryConfig::new("registry without scheme"));
    assert!(matches!(
        api.catalog("").await,
        Err(RegistryError::InvalidUrl { .. })
    ));
}

// =============================================================================
// Connection options
// =============================================================================

#[tokio::test]
async fn test_credentials_and_headers_are_sent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/_catalog")
        .match_header("authorization", "Basic Y2k6c2VjcmV0")
        .match_header("content-type", "application/json")
        .match_header("x-registry-client", "dockside")
        .with_status(200)
        .with_body(r#"{"repositories": ["team/app"]}"#)
        .create_async()
        .await;

    let api = RegistryApi::new(
        RegistryConfig::new(server.url())
            .with_credentials("ci", "secret")
            .with_header("X-Registry-Client", "dockside"),
    );

    let repos = api.catalog("team/").await.unwrap();
    assert_eq!(repos, vec![Repository::new("team/app")]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_connection_is_reused_across_calls() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/_catalog")
        .with_status(200)
        .with_body(r#"{"repositories": []}"#)
        .expect(3)
        .create_async()
        .await;

    let api = RegistryApi::new(RegistryConfig::new(server.url()));
    for _ in 0..3 {
        assert!(api.catalog("").await.unwrap().is_empty());
    }

    let first = api.transport().handle().unwrap();
    let second = api.transport().handle().unwrap();
    assert!(std::ptr::eq(first, second));
    mock.assert_async().await;
}
