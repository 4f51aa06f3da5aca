#![allow(dead_code)]

use axum::Router;
use axum::extract::ConnectInfo;
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use serde_json::{Value, json};
use snaplink::infrastructure::store::{KeyValueStore, MemoryStore};
use snaplink::routes::router;
use snaplink::state::{AppState, ServiceSettings};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;

pub const DOMAIN: &str = "short.io";
pub const WINDOW: Duration = Duration::from_secs(30 * 60);

pub fn test_settings(api_quota: u32) -> ServiceSettings {
    ServiceSettings {
        domain: DOMAIN.to_string(),
        api_quota,
        rate_limit_window: WINDOW,
        default_expiry_hours: 24,
    }
}

/// State over a fresh in-memory store. Client addresses come from
/// `X-Forwarded-For` so tests can simulate several clients.
pub fn create_test_state(api_quota: u32) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = create_state_with_store(store.clone(), api_quota);
    (state, store)
}

pub fn create_state_with_store(store: Arc<dyn KeyValueStore>, api_quota: u32) -> AppState {
    AppState::new(store, test_settings(api_quota), true)
}

pub fn create_test_server(state: AppState) -> TestServer {
    let app: Router = router(state).layer(MockConnectInfoLayer);
    TestServer::new(app).unwrap()
}

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

pub fn ip(addr: &'static str) -> HeaderValue {
    HeaderValue::from_static(addr)
}

pub fn shorten_body(url: &str) -> Value {
    json!({ "url": url })
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
