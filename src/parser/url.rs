//! Relay endpoint validation.

use tracing::debug;
use url::Url;

use super::error::{MAX_ENDPOINT_LENGTH, ParseError};

/// Validates a CORS relay endpoint prefix.
///
/// # Validation rules:
/// - Must not exceed `MAX_ENDPOINT_LENGTH` (2000 chars)
/// - Must be parseable by the `url` crate
/// - Must use http or https scheme
/// - Must have a host
///
/// The endpoint is returned exactly as given (trimmed): it is used as a
/// literal prefix, and normalization would drop a trailing `?`.
///
/// # Errors
///
/// Returns `ParseError::InvalidEndpoint` describing the first rule violated.
pub fn validate_relay_endpoint(raw: &str) -> Result<String, ParseError> {
    let endpoint = raw.trim();
    if endpoint.is_empty() {
        return Err(ParseError::invalid_endpoint(endpoint, "endpoint is empty"));
    }
    if endpoint.len() > MAX_ENDPOINT_LENGTH {
        return Err(ParseError::invalid_endpoint(
            endpoint,
            &format!("longer than {MAX_ENDPOINT_LENGTH} characters"),
        ));
    }

    let parsed =
        Url::parse(endpoint).map_err(|e| ParseError::invalid_endpoint(endpoint, &e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ParseError::invalid_endpoint(
                endpoint,
                &format!("scheme '{scheme}' is not supported"),
            ));
        }
    }

    if parsed.host().is_none() {
        return Err(ParseError::invalid_endpoint(endpoint, "URL has no host"));
    }

    debug!(endpoint = %endpoint, "relay endpoint validated");
    Ok(endpoint.to_string())
}
