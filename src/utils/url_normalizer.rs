//! Target URL validation and normalization.
//!
//! Accepts absolute URLs and scheme-less ones such as `example.com/page`,
//! which are treated as plain HTTP.

use url::{Host, Url};

/// Longest target URL accepted, matching common browser limits.
pub const MAX_URL_LENGTH: usize = 2083;

/// Errors that can occur during URL normalization.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UrlValidationError {
    #[error("URL is empty")]
    Empty,

    #[error("URL exceeds {MAX_URL_LENGTH} characters")]
    TooLong,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no valid host")]
    InvalidHost,
}

/// Validates `input` and returns it as an absolute URL.
///
/// # Normalization Rules
///
/// 1. **Scheme**: `http://` is prepended when the input has no explicit scheme
/// 2. **Protocol**: Only HTTP and HTTPS are allowed
/// 3. **Hostname**: Lowercased; must be `localhost`, an IP address, or a
///    dotted domain name
/// 4. **Default ports**: Removed (80 for HTTP, 443 for HTTPS)
/// 5. **Path, query, fragment**: Preserved
///
/// # Errors
///
/// Returns [`UrlValidationError::InvalidFormat`] for malformed URLs and
/// [`UrlValidationError::UnsupportedProtocol`] for non-HTTP(S) schemes.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_url("example.com/a").unwrap().as_str(),
///     "http://example.com/a"
/// );
/// assert_eq!(
///     normalize_url("HTTPS://EXAMPLE.COM:443/Path").unwrap().as_str(),
///     "https://example.com/Path"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<Url, UrlValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlValidationError::Empty);
    }
    if input.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    let url = Url::parse(&enforce_http(input))
        .map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    match url.host() {
        Some(Host::Domain(domain)) if is_plausible_domain(domain) => {}
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {}
        _ => return Err(UrlValidationError::InvalidHost),
    }

    Ok(url)
}

/// Returns true if `url` points back at the service itself.
///
/// Hosts are compared case-insensitively, ignoring a leading `www.` and any
/// port, so `https://www.SHORT.io/x` refers to the service domain `short.io`.
pub fn is_self_referencing(url: &Url, service_domain: &str) -> bool {
    let Some(target) = url.host_str() else {
        return false;
    };
    let Some(service) = domain_host(service_domain) else {
        return false;
    };

    strip_www(&target.to_ascii_lowercase()) == strip_www(&service)
}

/// Extracts the lowercased host from a configured domain such as
/// `short.io`, `localhost:3000`, or `https://short.io/`.
pub fn domain_host(domain: &str) -> Option<String> {
    let domain = domain.trim();
    if domain.is_empty() {
        return None;
    }

    Url::parse(&enforce_http(domain))
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
}

/// Returns `input` trimmed, with `http://` prepended unless it already
/// starts with a scheme.
///
/// This is the form a target URL is stored in; [`normalize_url`] only
/// validates it.
pub fn enforce_http(input: &str) -> String {
    let input = input.trim();
    if has_explicit_scheme(input) {
        input.to_string()
    } else {
        format!("http://{}", input)
    }
}

/// True if `input` starts with `scheme://`, where the scheme is
/// `[A-Za-z][A-Za-z0-9+.-]*`. A `://` inside a path or query does not count.
fn has_explicit_scheme(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };

    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

fn is_plausible_domain(domain: &str) -> bool {
    if domain == "localhost" {
        return true;
    }

    let labels: Vec<&str> = domain.trim_end_matches('.').split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}
