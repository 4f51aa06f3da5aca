//! Data Transfer Objects for API requests and responses.
//!
//! DTOs only describe the wire format; validation happens in
//! [`crate::application::services::ShortenService`].

pub mod health;
pub mod shorten;
