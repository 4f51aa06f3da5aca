mod common;

use axum::http::StatusCode;
use common::shorten_body;
use serde_json::json;
use snaplink::api::dto::shorten::ShortenResponse;
use snaplink::application::services::LinkRegistry;
use std::time::Duration;

#[tokio::test]
async fn test_redirect_success() {
    let (state, store) = common::create_test_state(10);
    let server = common::create_test_server(state);

    let created = server
        .post("/api/v1")
        .json(&json!({ "url": "https://example.com/a/b", "short": "abc123" }))
        .await;
    created.assert_status_ok();

    let response = server.get("/abc123").await;

    response.assert_status(StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.header("location"), "https://example.com/a/b");

    let registry = LinkRegistry::new(store);
    assert_eq!(registry.redirect_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_redirect_counts_every_hit() {
    let (state, store) = common::create_test_state(10);
    let server = common::create_test_server(state);

    let short = server
        .post("/api/v1")
        .json(&shorten_body("https://example.com"))
        .await
        .json::<ShortenResponse>()
        .short;
    let path = format!("/{}", short.strip_prefix("short.io/").unwrap());

    for _ in 0..3 {
        server
            .get(&path)
            .await
            .assert_status(StatusCode::MOVED_PERMANENTLY);
    }

    let registry = LinkRegistry::new(store);
    assert_eq!(registry.redirect_count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_redirect_not_found() {
    let (state, store) = common::create_test_state(10);
    let server = common::create_test_server(state);

    let response = server.get("/nonexistent").await;

    response.assert_status_not_found();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "short url not found");

    let registry = LinkRegistry::new(store);
    assert_eq!(registry.redirect_count().await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_redirect_expired_link() {
    let (state, _store) = common::create_test_state(10);
    let server = common::create_test_server(state);

    server
        .post("/api/v1")
        .json(&json!({ "url": "https://example.com", "short": "brief", "expiry": 1 }))
        .await
        .assert_status_ok();

    tokio::time::advance(Duration::from_secs(59 * 60)).await;
    server
        .get("/brief")
        .await
        .assert_status(StatusCode::MOVED_PERMANENTLY);

    tokio::time::advance(Duration::from_secs(60)).await;
    server.get("/brief").await.assert_status_not_found();
}

#[tokio::test(start_paused = true)]
async fn test_expired_custom_id_can_be_reused() {
    let (state, _store) = common::create_test_state(10);
    let server = common::create_test_server(state);

    server
        .post("/api/v1")
        .json(&json!({ "url": "https://old.example.com", "short": "promo", "expiry": 1 }))
        .await
        .assert_status_ok();

    tokio::time::advance(Duration::from_secs(3600)).await;

    server
        .post("/api/v1")
        .json(&json!({ "url": "https://new.example.com", "short": "promo" }))
        .await
        .assert_status_ok();

    let response = server.get("/promo").await;
    assert_eq!(response.header("location"), "https://new.example.com");
}

#[tokio::test]
async fn test_registry_shared_with_state() {
    let (state, store) = common::create_test_state(10);
    let registry = LinkRegistry::new(store);
    registry
        .create("seeded", "https://example.com/seeded", Duration::from_secs(3600))
        .await
        .unwrap();

    let server = common::create_test_server(state);
    let response = server.get("/seeded").await;

    response.assert_status(StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.header("location"), "https://example.com/seeded");
}
