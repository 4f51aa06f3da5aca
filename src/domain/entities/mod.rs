//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic. All of them are
//! owned by the key/value store; services only hold them for the duration of
//! a request.
//!
//! # Entity Types
//!
//! - [`LinkRecord`] - A short identifier mapped to a target URL
//! - [`QuotaRecord`] - A client's remaining quota in the current window
//! - [`RateLimitDecision`] - Result of checking a client's quota

pub mod link;
pub mod quota;

pub use link::LinkRecord;
pub use quota::{QuotaRecord, RateLimitDecision};
