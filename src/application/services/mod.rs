//! Business logic services for the application layer.

pub mod id_allocator;
pub mod link_registry;
pub mod rate_limiter;
pub mod resolve_service;
pub mod shorten_service;

pub use id_allocator::ShortIdAllocator;
pub use link_registry::LinkRegistry;
pub use rate_limiter::RateLimiter;
pub use resolve_service::ResolveService;
pub use shorten_service::{ShortenCommand, ShortenOutcome, ShortenService};
