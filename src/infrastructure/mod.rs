//! Infrastructure layer for external integrations.
//!
//! This layer implements the storage contract used by the application
//! services.
//!
//! # Modules
//!
//! - [`store`] - Key/value store abstraction (Redis and in-process implementations)

pub mod store;
