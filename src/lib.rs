//! # Snaplink
//!
//! An expiring URL shortener with per-client request quotas, built with Axum
//! and Redis.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Link and quota entities
//! - **Application Layer** ([`application`]) - Rate limiting, identifier
//!   allocation, shortening and redirect orchestration
//! - **Infrastructure Layer** ([`infrastructure`]) - Key/value store with
//!   Redis and in-memory backends
//! - **API Layer** ([`api`]) - REST handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Random or custom short identifiers with per-link expiry
//! - Fixed-window quota per client address
//! - Global redirect counter
//!
//! ## Quick Start
//!
//! ```bash
//! export DOMAIN="s.example.com"
//! export REDIS_URL="redis://localhost:6379"  # Optional, in-memory otherwise
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        LinkRegistry, RateLimiter, ResolveService, ShortenCommand, ShortenService,
    };
    pub use crate::domain::entities::{LinkRecord, QuotaRecord, RateLimitDecision};
    pub use crate::error::AppError;
    pub use crate::infrastructure::store::{KeyValueStore, MemoryStore, Namespace, RedisStore};
    pub use crate::state::{AppState, ServiceSettings};
}
