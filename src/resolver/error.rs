//! Error types for link rule operations.
//!
//! Resolution as a whole never fails: a rule that cannot finish declines with
//! one of these errors and the next rule in the table gets the reference.
//! Messages follow the What/Why/Fix pattern used across the project.

use thiserror::Error;

/// Reasons a link rule declined a reference it initially claimed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The provider link carries no file identifier the rule can use
    #[error("no file identifier in '{input}' for {provider}\n  Suggestion: {suggestion}")]
    NoIdentifier {
        /// The reference that was inspected
        input: String,
        /// Provider the rule targets (e.g. "Google Drive")
        provider: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The reference could not be rewritten by a rule that matched it
    #[error("cannot rewrite '{input}': {reason}\n  Suggestion: {suggestion}")]
    RewriteFailed {
        /// The reference that failed rewriting
        input: String,
        /// Why rewriting failed
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },
}

impl ResolveError {
    /// Creates a `NoIdentifier` error for a provider link without a usable id.
    #[must_use]
    pub fn no_identifier(input: &str, provider: &str) -> Self {
        Self::NoIdentifier {
            input: input.to_string(),
            provider: provider.to_string(),
            suggestion: "Share the file link (…/d/<id>/…) or a link with an id=<id> parameter"
                .to_string(),
        }
    }

    /// Creates a `RewriteFailed` error.
    #[must_use]
    pub fn rewrite_failed(input: &str, reason: &str) -> Self {
        Self::RewriteFailed {
            input: input.to_string(),
            reason: reason.to_string(),
            suggestion: "Check the link format or pass a direct download URL".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_error_no_identifier_message() {
        let err = ResolveError::no_identifier("https://drive.google.com/drive/my-drive", "Google Drive");
        let msg = err.to_string();
        assert!(msg.contains("drive.google.com"), "should contain input");
        assert!(msg.contains("Google Drive"), "should name provider");
        assert!(msg.contains("Suggestion"), "should have suggestion");
    }

    #[test]
    fn test_resolve_error_rewrite_failed_message() {
        let err = ResolveError::rewrite_failed("https://github.com/x", "no /blob/ segment");
        let msg = err.to_string();
        assert!(msg.contains("github.com/x"), "should contain input");
        assert!(msg.contains("no /blob/ segment"), "should contain reason");
        assert!(msg.contains("direct download"), "should have suggestion");
    }

    #[test]
    fn test_resolve_error_clone() {
        let err = ResolveError::no_identifier("x", "Google Drive");
        assert_eq!(err.clone(), err);
    }
}
