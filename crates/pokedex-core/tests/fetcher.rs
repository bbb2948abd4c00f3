//! End-to-end fetcher behavior against a mock HTTP server.

use std::time::Duration;

use mockito::{Matcher, Server, ServerGuard};
use pokedex_core::{
    ApiClient, ApiError, PageDescriptor, ResourceFetcher, RetryPolicy, Storage, TimedCache,
};
use serde_json::json;

fn quick_retries() -> RetryPolicy {
    RetryPolicy::new(2, Duration::from_millis(1))
}

fn fetcher_for(base_url: &str, storage: Storage) -> ResourceFetcher {
    let api = ApiClient::with_options(base_url, Duration::from_secs(5)).unwrap();
    ResourceFetcher::new(api, TimedCache::new(storage)).with_retry_policy(quick_retries())
}

fn pikachu_body() -> String {
    json!({
        "id": 25,
        "name": "pikachu",
        "height": 4,
        "weight": 60,
        "base_experience": 112,
        "types": [{"slot": 1, "type": {"name": "electric", "url": ""}}],
        "abilities": [
            {"ability": {"name": "static", "url": ""}, "is_hidden": false, "slot": 1},
            {"ability": {"name": "lightning-rod", "url": ""}, "is_hidden": true, "slot": 3}
        ]
    })
    .to_string()
}

fn page_body(count: u32, names: &[&str]) -> String {
    let results: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({"name": name, "url": format!("https://pokeapi.co/api/v2/pokemon/{}/", i + 1)})
        })
        .collect();
    json!({"count": count, "next": null, "previous": null, "results": results}).to_string()
}

fn page_query(offset: u32, limit: u32) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("offset".into(), offset.to_string()),
        Matcher::UrlEncoded("limit".into(), limit.to_string()),
    ])
}

async fn seed_pikachu(server: &mut ServerGuard, storage: &Storage) {
    let mock = server
        .mock("GET", "/pokemon/pikachu")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(pikachu_body())
        .create_async()
        .await;
    fetcher_for(&server.url(), storage.clone())
        .fetch_entity("pikachu")
        .await
        .unwrap();
    mock.remove_async().await;
}

#[tokio::test]
async fn test_successful_fetch_is_cached_then_used_as_fallback() {
    let mut server = Server::new_async().await;
    let storage = Storage::in_memory();
    let mock = server
        .mock("GET", "/pokemon/pikachu")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(pikachu_body())
        .expect(1)
        .create_async()
        .await;

    let fresh = fetcher_for(&server.url(), storage.clone())
        .fetch_entity("  Pikachu ")
        .await
        .unwrap();
    mock.assert_async().await;

    assert!(!fresh.from_cache);
    assert!(!fresh.fallback);
    assert_eq!(fresh.data.id, 25);
    assert_eq!(fresh.data.type_names(), vec!["electric"]);

    // Nothing listens on the discard port
    let offline = fetcher_for("http://127.0.0.1:9", storage);
    let degraded = offline.fetch_entity("pikachu").await.unwrap();

    assert!(degraded.from_cache);
    assert!(degraded.fallback);
    assert_eq!(degraded.data, fresh.data);
    assert!(matches!(degraded.original_error, Some(ApiError::Network(_))));
}

#[tokio::test]
async fn test_rate_limit_is_retried_then_surfaced() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/pokemon/pikachu")
        .with_status(429)
        .with_body(r#"{"detail": "Too many requests"}"#)
        .expect(3)
        .create_async()
        .await;

    let fetcher = fetcher_for(&server.url(), Storage::in_memory());
    let err = fetcher.fetch_entity("pikachu").await.unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.status(), Some(429));
    assert!(matches!(err, ApiError::RateLimited(ref m) if m == "Too many requests"));
}

#[tokio::test]
async fn test_rate_limit_with_cached_entry_falls_back() {
    let mut server = Server::new_async().await;
    let storage = Storage::in_memory();
    seed_pikachu(&mut server, &storage).await;

    let mock = server
        .mock("GET", "/pokemon/pikachu")
        .with_status(429)
        .expect(3)
        .create_async()
        .await;

    let result = fetcher_for(&server.url(), storage)
        .fetch_entity("pikachu")
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(result.from_cache);
    assert!(result.fallback);
    assert_eq!(
        result.original_error.as_ref().and_then(ApiError::status),
        Some(429)
    );
}

#[tokio::test]
async fn test_server_error_exhausts_retries() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/pokemon/eevee")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let err = fetcher_for(&server.url(), Storage::in_memory())
        .fetch_entity("eevee")
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, ApiError::ServerError { status: 503, .. }));
}

#[tokio::test]
async fn test_zero_retries_makes_one_attempt() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/pokemon/eevee")
        .with_status(502)
        .expect(1)
        .create_async()
        .await;

    let fetcher = fetcher_for(&server.url(), Storage::in_memory());
    let policy = RetryPolicy::new(0, Duration::from_millis(1));
    let err = fetcher.fetch_entity_with("eevee", &policy).await.unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn test_not_found_is_requested_once() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/pokemon/missingno")
        .with_status(404)
        .with_body("Not Found")
        .expect(1)
        .create_async()
        .await;

    let err = fetcher_for(&server.url(), Storage::in_memory())
        .fetch_entity("missingno")
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, ApiError::NotFound(_)));
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_not_found_with_cached_entry_falls_back() {
    let mut server = Server::new_async().await;
    let storage = Storage::in_memory();
    seed_pikachu(&mut server, &storage).await;

    let mock = server
        .mock("GET", "/pokemon/pikachu")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let result = fetcher_for(&server.url(), storage)
        .fetch_entity("pikachu")
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(result.fallback);
}

#[tokio::test]
async fn test_undecodable_body_is_invalid_response() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/pokemon/glitch")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .expect(1)
        .create_async()
        .await;

    let err = fetcher_for(&server.url(), Storage::in_memory())
        .fetch_entity("glitch")
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_page_is_served_from_cache_on_second_call() {
    let mut server = Server::new_async().await;
    let names: Vec<String> = (1..=24).map(|i| format!("mon-{}", i)).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let mock = server
        .mock("GET", "/pokemon")
        .match_query(page_query(0, 24))
        .with_status(200)
        .with_body(page_body(1302, &names))
        .expect(1)
        .create_async()
        .await;

    let fetcher = fetcher_for(&server.url(), Storage::in_memory());
    let page = PageDescriptor::new(0, 24);

    let first = fetcher.fetch_page(page).await.unwrap();
    let second = fetcher.fetch_page(page).await.unwrap();

    mock.assert_async().await;
    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(second.data.count, 1302);
    assert!(second.data.results.len() <= 24);
    assert_eq!(second.data.results[0].id(), "1");
}

#[tokio::test]
async fn test_page_failure_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/pokemon")
        .match_query(page_query(24, 24))
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let err = fetcher_for(&server.url(), Storage::in_memory())
        .fetch_page(PageDescriptor::new(24, 24))
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_different_page_sizes_are_cached_separately() {
    let mut server = Server::new_async().await;
    let small = server
        .mock("GET", "/pokemon")
        .match_query(page_query(0, 12))
        .with_body(page_body(1302, &["bulbasaur"]))
        .expect(1)
        .create_async()
        .await;
    let large = server
        .mock("GET", "/pokemon")
        .match_query(page_query(0, 48))
        .with_body(page_body(1302, &["bulbasaur", "ivysaur"]))
        .expect(1)
        .create_async()
        .await;

    let fetcher = fetcher_for(&server.url(), Storage::in_memory());
    fetcher.fetch_page(PageDescriptor::new(0, 12)).await.unwrap();
    let result = fetcher.fetch_page(PageDescriptor::new(0, 48)).await.unwrap();

    small.assert_async().await;
    large.assert_async().await;
    assert_eq!(result.data.results.len(), 2);
}
