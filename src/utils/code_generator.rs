//! Short code generation and validation utilities.
//!
//! Provides random code generation from a cryptographically secure source and
//! validation for custom user-provided codes.

use rand::{Rng, distr::Alphanumeric};
use regex::Regex;
use std::sync::LazyLock;
use validator::ValidationError;

/// Length of generated short codes.
pub const CODE_LENGTH: usize = 6;

/// Longest custom code accepted.
pub const MAX_CUSTOM_CODE_LENGTH: usize = 32;

static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("custom code regex is valid"));

/// Reserved codes that cannot be used as short links.
///
/// These collide with fixed routes and would never be reachable.
const RESERVED_CODES: &[&str] = &["api", "health"];

/// Generates a random alphanumeric short code of [`CODE_LENGTH`] characters.
///
/// Draws from the thread-local CSPRNG. Codes are not unique by construction;
/// callers must check them for collisions.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 1-32 characters
/// - Allowed characters: ASCII letters, digits, hyphens, underscores
/// - Cannot be a reserved route name
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the violated rule.
pub fn validate_custom_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() || code.len() > MAX_CUSTOM_CODE_LENGTH {
        return Err(ValidationError::new("custom_code_length"));
    }

    if !CUSTOM_CODE_REGEX.is_match(code) {
        return Err(ValidationError::new("custom_code_charset"));
    }

    if RESERVED_CODES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(code))
    {
        return Err(ValidationError::new("custom_code_reserved"));
    }

    Ok(())
}
