//! Orchestration of the "shorten a URL" request.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use validator::{Validate, ValidationErrors};

use crate::application::services::{LinkRegistry, RateLimiter, ShortIdAllocator};
use crate::domain::entities::{LinkRecord, RateLimitDecision};
use crate::error::AppError;
use crate::utils::code_generator::validate_custom_code;
use crate::utils::duration::hours;
use crate::utils::url_normalizer::{enforce_http, is_self_referencing, normalize_url};

/// Longest expiry a link may request: ten years.
pub const MAX_EXPIRY_HOURS: u64 = 10 * 365 * 24;

/// Input of a shortening request.
#[derive(Debug, Clone, Default, Validate)]
pub struct ShortenCommand {
    /// Target URL; a missing scheme means `http://`.
    pub url: String,

    /// Caller-chosen identifier; generated when absent.
    #[validate(custom(function = "validate_custom_code"))]
    pub short: Option<String>,

    /// Lifetime in hours; the service default applies when absent or zero.
    #[validate(range(max = MAX_EXPIRY_HOURS))]
    pub expiry_hours: Option<u64>,
}

/// Result of a successful shortening request.
#[derive(Debug, Clone)]
pub struct ShortenOutcome {
    pub link: LinkRecord,
    /// Service domain followed by the identifier.
    pub short_url: String,
    pub expiry_hours: u64,
    /// Quota state after this request was counted.
    pub rate_limit: RateLimitDecision,
}

/// Service for creating short links on behalf of a client.
///
/// # Request Flow
///
/// 1. Check and consume the client's quota
/// 2. Validate the URL, custom identifier, and expiry
/// 3. Reject URLs pointing back at the service domain
/// 4. Normalize the URL (`http://` when no scheme is given)
/// 5. Allocate an identifier
/// 6. Store the link with its expiry
///
/// A failure in steps 2-6 refunds the quota unit, so only completed
/// requests count against the client.
pub struct ShortenService {
    rate_limiter: Arc<RateLimiter>,
    allocator: ShortIdAllocator,
    registry: Arc<LinkRegistry>,
    domain: String,
    default_expiry_hours: u64,
}

impl ShortenService {
    pub fn new(
        rate_limiter: Arc<RateLimiter>,
        allocator: ShortIdAllocator,
        registry: Arc<LinkRegistry>,
        domain: String,
        default_expiry_hours: u64,
    ) -> Self {
        Self {
            rate_limiter,
            allocator,
            registry,
            domain,
            default_expiry_hours,
        }
    }

    /// Shortens `command.url` for the client at `client_key`.
    ///
    /// # Errors
    ///
    /// - [`AppError::RateLimited`] if the client's quota is exhausted
    /// - [`AppError::InvalidUrl`], [`AppError::InvalidShortId`],
    ///   [`AppError::InvalidExpiry`] for malformed input
    /// - [`AppError::InvalidDomain`] if the URL points at the service itself
    /// - [`AppError::AlreadyExists`] if the custom identifier is taken
    /// - [`AppError::SaveFailed`] on store errors
    pub async fn shorten(
        &self,
        client_key: &str,
        command: ShortenCommand,
    ) -> Result<ShortenOutcome, AppError> {
        let decision = self
            .rate_limiter
            .check_and_consume(client_key)
            .await
            .map_err(AppError::SaveFailed)?;

        if !decision.admitted {
            metrics::counter!("shortener_rate_limited_total").increment(1);
            info!(client = client_key, reset_in = ?decision.reset_in, "Rate limit exceeded");
            return Err(AppError::RateLimited {
                reset_in: decision.reset_in,
            });
        }

        match self.create_link(command).await {
            Ok((link, expiry_hours)) => {
                metrics::counter!("shortener_links_created_total").increment(1);
                info!(
                    client = client_key,
                    id = %link.id,
                    expiry_hours,
                    remaining = decision.remaining,
                    "Short link created"
                );

                Ok(ShortenOutcome {
                    short_url: self.short_url(&link.id),
                    link,
                    expiry_hours,
                    rate_limit: decision,
                })
            }
            Err(err) => {
                if let Err(e) = self.rate_limiter.refund(client_key).await {
                    warn!(client = client_key, error = %e, "Failed to refund quota unit");
                }
                Err(err)
            }
        }
    }

    /// Builds the public short URL for an identifier.
    pub fn short_url(&self, id: &str) -> String {
        format!("{}/{}", self.domain.trim_end_matches('/'), id)
    }

    async fn create_link(&self, command: ShortenCommand) -> Result<(LinkRecord, u64), AppError> {
        let url = normalize_url(&command.url).map_err(|e| {
            debug!(url = %command.url, reason = %e, "Rejected target URL");
            AppError::InvalidUrl
        })?;

        command.validate().map_err(map_validation_errors)?;

        if is_self_referencing(&url, &self.domain) {
            debug!(url = %url, "Rejected self-referencing URL");
            return Err(AppError::InvalidDomain);
        }

        let expiry_hours = command
            .expiry_hours
            .filter(|&h| h > 0)
            .unwrap_or(self.default_expiry_hours);
        let ttl: Duration = hours(expiry_hours).ok_or(AppError::InvalidExpiry)?;

        let id = self.allocator.allocate(command.short.as_deref()).await?;
        let link = self
            .registry
            .create(&id, &enforce_http(&command.url), ttl)
            .await?;

        Ok((link, expiry_hours))
    }
}

fn map_validation_errors(errors: ValidationErrors) -> AppError {
    let fields = errors.field_errors();
    if fields.contains_key("short") {
        AppError::InvalidShortId
    } else if fields.contains_key("expiry_hours") {
        AppError::InvalidExpiry
    } else {
        AppError::InvalidUrl
    }
}
