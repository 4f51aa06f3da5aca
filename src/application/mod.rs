//! Application layer services implementing business logic.
//!
//! Services coordinate store calls, validation, and quota rules, and give
//! HTTP handlers and the admin CLI a narrow API.
//!
//! # Available Services
//!
//! - [`services::shorten_service::ShortenService`] - Rate-limited link creation
//! - [`services::resolve_service::ResolveService`] - Redirect lookup and counting
//! - [`services::rate_limiter::RateLimiter`] - Per-client quota windows
//! - [`services::id_allocator::ShortIdAllocator`] - Identifier choice and collisions
//! - [`services::link_registry::LinkRegistry`] - Link records and the redirect counter

pub mod services;
