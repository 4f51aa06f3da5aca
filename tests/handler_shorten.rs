mod common;

use axum::http::StatusCode;
use common::{X_FORWARDED_FOR, ip, shorten_body};
use serde_json::json;
use snaplink::api::dto::shorten::ShortenResponse;
use snaplink::infrastructure::store::{KeyValueStore, Namespace};
use std::time::Duration;

#[tokio::test]
async fn test_shorten_success() {
    let (state, store) = common::create_test_state(10);
    let server = common::create_test_server(state);

    let response = server
        .post("/api/v1")
        .add_header(X_FORWARDED_FOR, ip("203.0.113.7"))
        .json(&shorten_body("https://example.com/a/b"))
        .await;

    response.assert_status_ok();

    let body = response.json::<ShortenResponse>();
    assert_eq!(body.url, "https://example.com/a/b");
    assert_eq!(body.expiry, 24);
    assert_eq!(body.rate_limit, 9);
    assert_eq!(body.rate_limit_reset, 30);

    let id = body.short.strip_prefix("short.io/").unwrap();
    assert_eq!(id.len(), 6);

    let stored = store.get(Namespace::Links, id).await.unwrap();
    assert_eq!(stored.as_deref(), Some("https://example.com/a/b"));
}

#[tokio::test]
async fn test_shorten_response_fields() {
    let (state, _store) = common::create_test_state(10);
    let server = common::create_test_server(state);

    let response = server
        .post("/api/v1")
        .json(&json!({ "url": "example.com", "short": "docs", "expiry": 5 }))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["url"], "http://example.com");
    assert_eq!(json["short"], "short.io/docs");
    assert_eq!(json["expiry"], 5);
    assert!(json.get("rate_limit").is_some());
    assert!(json.get("rate_limit_reset").is_some());
}

#[tokio::test]
async fn test_shorten_falls_back_to_peer_address() {
    let (state, store) = common::create_test_state(10);
    let server = common::create_test_server(state);

    server
        .post("/api/v1")
        .json(&shorten_body("https://example.com"))
        .await
        .assert_status_ok();

    let quota = store.get(Namespace::Quota, "127.0.0.1").await.unwrap();
    assert_eq!(quota.as_deref(), Some("9"));
}

#[tokio::test]
async fn test_shorten_malformed_json() {
    let (state, _store) = common::create_test_state(10);
    let server = common::create_test_server(state);

    let response = server.post("/api/v1").text("{not json").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "cannot parse JSON");

    let response = server.post("/api/v1").json(&json!({ "short": "abc" })).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "cannot parse JSON");
}

#[tokio::test]
async fn test_shorten_invalid_url() {
    let (state, _store) = common::create_test_state(10);
    let server = common::create_test_server(state);

    let response = server
        .post("/api/v1")
        .json(&shorten_body("ftp://example.com/file"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "invalid URL");
}

#[tokio::test]
async fn test_shorten_self_referencing_url() {
    let (state, _store) = common::create_test_state(10);
    let server = common::create_test_server(state);

    let response = server
        .post("/api/v1")
        .json(&shorten_body("https://short.io/abc123"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "invalid domain");
}

#[tokio::test]
async fn test_shorten_invalid_custom_id() {
    let (state, _store) = common::create_test_state(10);
    let server = common::create_test_server(state);

    let too_long = "x".repeat(33);

    for short in ["has space", "health", too_long.as_str()] {
        let response = server
            .post("/api/v1")
            .json(&json!({ "url": "https://example.com", "short": short }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["error"], "invalid short URL");
    }
}

#[tokio::test]
async fn test_shorten_duplicate_custom_id_forbidden() {
    let (state, _store) = common::create_test_state(10);
    let server = common::create_test_server(state);
    let body = json!({ "url": "https://example.com", "short": "mylink" });

    server.post("/api/v1").json(&body).await.assert_status_ok();

    let response = server.post("/api/v1").json(&body).await;

    response.assert_status(StatusCode::FORBIDDEN);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "short URL already exists");
}

#[tokio::test]
async fn test_failed_request_keeps_quota() {
    let (state, _store) = common::create_test_state(10);
    let server = common::create_test_server(state);

    server
        .post("/api/v1")
        .json(&shorten_body("https://short.io"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/v1")
        .json(&shorten_body("https://example.com"))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<ShortenResponse>().rate_limit, 9);
}

#[tokio::test(start_paused = true)]
async fn test_shorten_rate_limited_after_quota() {
    let (state, _store) = common::create_test_state(10);
    let server = common::create_test_server(state);

    for expected in (0..10).rev() {
        let response = server
            .post("/api/v1")
            .add_header(X_FORWARDED_FOR, ip("198.51.100.4"))
            .json(&shorten_body("https://example.com"))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<ShortenResponse>().rate_limit, expected);
    }

    tokio::time::advance(Duration::from_secs(5 * 60 + 30)).await;

    let response = server
        .post("/api/v1")
        .add_header(X_FORWARDED_FOR, ip("198.51.100.4"))
        .json(&shorten_body("https://example.com"))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "rate limit exceeded");
    // 24m30s left, reported in whole minutes rounded up
    assert_eq!(json["rate_limit_reset"], 25);

    // Other clients are unaffected
    server
        .post("/api/v1")
        .add_header(X_FORWARDED_FOR, ip("198.51.100.5"))
        .json(&shorten_body("https://example.com"))
        .await
        .assert_status_ok();
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_resets_after_window() {
    let (state, _store) = common::create_test_state(1);
    let server = common::create_test_server(state);

    server
        .post("/api/v1")
        .json(&shorten_body("https://example.com"))
        .await
        .assert_status_ok();
    server
        .post("/api/v1")
        .json(&shorten_body("https://example.com"))
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    tokio::time::advance(common::WINDOW).await;

    let response = server
        .post("/api/v1")
        .json(&shorten_body("https://example.com"))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<ShortenResponse>().rate_limit, 0);
}
