//! Short identifier allocation and collision policy.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::services::LinkRegistry;
use crate::error::AppError;
use crate::infrastructure::store::StoreError;
use crate::utils::code_generator::generate_code;

/// Fresh candidates tried for an auto-generated identifier before giving up.
pub const MAX_GENERATION_ATTEMPTS: usize = 10;

/// Picks the identifier for a new link.
///
/// A caller-supplied candidate is checked once and never replaced. Generated
/// candidates are retried with new random values on collision.
pub struct ShortIdAllocator {
    registry: Arc<LinkRegistry>,
    generator: fn() -> String,
}

impl ShortIdAllocator {
    pub fn new(registry: Arc<LinkRegistry>) -> Self {
        Self {
            registry,
            generator: generate_code,
        }
    }

    /// Replaces the random candidate source.
    pub fn with_generator(mut self, generator: fn() -> String) -> Self {
        self.generator = generator;
        self
    }

    /// Returns an identifier that no live link currently uses.
    ///
    /// The check is advisory: the link is written create-only afterwards, so a
    /// concurrent request claiming the same identifier still fails cleanly.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AlreadyExists`] if `candidate` is taken.
    /// Returns [`AppError::SaveFailed`] on store errors, or when
    /// [`MAX_GENERATION_ATTEMPTS`] generated candidates all collided.
    pub async fn allocate(&self, candidate: Option<&str>) -> Result<String, AppError> {
        if let Some(candidate) = candidate {
            if self.is_taken(candidate).await? {
                debug!(id = candidate, "Requested short id already in use");
                return Err(AppError::AlreadyExists);
            }
            return Ok(candidate.to_string());
        }

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let generated = (self.generator)();
            if !self.is_taken(&generated).await? {
                return Ok(generated);
            }
            debug!(id = %generated, attempt, "Generated short id collided");
        }

        warn!(
            attempts = MAX_GENERATION_ATTEMPTS,
            "Failed to generate unique short id"
        );
        Err(AppError::SaveFailed(StoreError::Operation(format!(
            "no free short id after {} attempts",
            MAX_GENERATION_ATTEMPTS
        ))))
    }

    async fn is_taken(&self, id: &str) -> Result<bool, AppError> {
        self.registry.exists(id).await.map_err(AppError::SaveFailed)
    }
}
