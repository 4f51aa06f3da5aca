//! Utility functions for code generation, URL processing, and request handling.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_normalizer`] - URL validation, normalization, and self-reference detection
//! - [`client_addr`] - Client address extraction from requests
//! - [`duration`] - Duration conversions used by API responses

pub mod client_addr;
pub mod code_generator;
pub mod duration;
pub mod url_normalizer;
