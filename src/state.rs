//! Shared state handed to every request handler.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{
    LinkRegistry, RateLimiter, ResolveService, ShortIdAllocator, ShortenService,
};
use crate::config::Config;
use crate::infrastructure::store::KeyValueStore;

/// Application state cloned into each handler.
///
/// Services are behind `Arc`, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub shorten_service: Arc<ShortenService>,
    pub resolve_service: Arc<ResolveService>,
    pub store: Arc<dyn KeyValueStore>,
    /// Read the client address from proxy headers instead of the socket peer.
    pub behind_proxy: bool,
}

/// Quota and link settings the services are built from.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub domain: String,
    pub api_quota: u32,
    pub rate_limit_window: Duration,
    pub default_expiry_hours: u64,
}

impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        Self {
            domain: config.domain.clone(),
            api_quota: config.api_quota,
            rate_limit_window: config.rate_limit_window(),
            default_expiry_hours: config.default_expiry_hours,
        }
    }
}

impl AppState {
    /// Wires all services on top of a single store.
    pub fn new(store: Arc<dyn KeyValueStore>, settings: ServiceSettings, behind_proxy: bool) -> Self {
        let registry = Arc::new(LinkRegistry::new(store.clone()));
        let rate_limiter = Arc::new(RateLimiter::new(
            store.clone(),
            settings.api_quota,
            settings.rate_limit_window,
        ));

        let shorten_service = Arc::new(ShortenService::new(
            rate_limiter,
            ShortIdAllocator::new(registry.clone()),
            registry.clone(),
            settings.domain,
            settings.default_expiry_hours,
        ));
        let resolve_service = Arc::new(ResolveService::new(registry));

        Self {
            shorten_service,
            resolve_service,
            store,
            behind_proxy,
        }
    }
}
