use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::services::LinkRegistry;
use crate::error::AppError;

/// Resolves short identifiers for redirection and counts each redirect.
pub struct ResolveService {
    registry: Arc<LinkRegistry>,
}

impl ResolveService {
    pub fn new(registry: Arc<LinkRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the target URL of a live link and counts the redirect.
    ///
    /// Counting is best effort: a failed increment is logged and the
    /// redirect still succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown or expired identifiers and
    /// [`AppError::Storage`] if the lookup fails.
    pub async fn resolve(&self, id: &str) -> Result<String, AppError> {
        let target = self.registry.resolve(id).await?;

        match self.registry.record_redirect().await {
            Ok(total) => debug!(id, total, "Redirect counted"),
            Err(e) => warn!(id, error = %e, "Failed to count redirect"),
        }
        metrics::counter!("shortener_redirects_total").increment(1);

        Ok(target)
    }

    pub async fn redirect_count(&self) -> Result<i64, AppError> {
        Ok(self.registry.redirect_count().await?)
    }
}
