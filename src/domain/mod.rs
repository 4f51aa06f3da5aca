//! Domain layer containing business entities.
//!
//! - [`entities`] - Core business data structures
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Business rules live in [`crate::application::services`].

pub mod entities;
