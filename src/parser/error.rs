//! Error types for parsing user-supplied setting values.

use thiserror::Error;

/// Maximum relay endpoint length to accept (standard browser URL limit).
pub const MAX_ENDPOINT_LENGTH: usize = 2000;

/// Errors that can occur while parsing labels and endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A label-valued setting got an unknown label
    #[error("invalid value '{value}' for `{field}`\n  Suggestion: use one of: {expected}")]
    InvalidValue {
        /// Setting name
        field: String,
        /// The rejected value
        value: String,
        /// Accepted values, comma separated
        expected: String,
    },

    /// A relay endpoint is not an absolute http(s) URL
    #[error("invalid relay endpoint '{endpoint}': {reason}\n  Suggestion: {suggestion}")]
    InvalidEndpoint {
        /// The endpoint that failed validation
        endpoint: String,
        /// Why it is invalid
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },
}

impl ParseError {
    /// Creates an `InvalidValue` error.
    #[must_use]
    pub fn invalid_value(field: &str, value: &str, expected: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Creates an `InvalidEndpoint` error.
    #[must_use]
    pub fn invalid_endpoint(endpoint: &str, reason: &str) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.chars().take(80).collect(),
            reason: reason.to_string(),
            suggestion: "Use an http:// or https:// prefix such as https://corsproxy.io/?"
                .to_string(),
        }
    }
}
