//! Error types for the book module.

use thiserror::Error;

/// Errors raised while reading an EPUB.
#[derive(Debug, Error)]
pub enum BookError {
    /// The buffer is not an EPUB the parser accepts (bad container, missing OPF).
    #[error(
        "cannot open book: {reason}\n  Suggestion: check that the link points at the .epub file, not a preview page"
    )]
    Open {
        /// Parser failure description.
        reason: String,
    },

    /// Every scanned chapter was empty or unreadable.
    #[error(
        "no text extracted from {scanned} of {spine_len} spine items\n  Suggestion: the book may be DRM-protected or contain only images"
    )]
    NoText {
        /// Total spine items in the book.
        spine_len: usize,
        /// Spine items that were looked at.
        scanned: usize,
    },
}

impl BookError {
    /// Creates an open error.
    pub fn open(reason: impl Into<String>) -> Self {
        Self::Open {
            reason: reason.into(),
        }
    }

    /// Creates a no-text error.
    #[must_use]
    pub fn no_text(spine_len: usize, scanned: usize) -> Self {
        Self::NoText { spine_len, scanned }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_error_no_text_display() {
        let msg = BookError::no_text(12, 12).to_string();
        assert!(msg.contains("no text extracted from 12 of 12"));
        assert!(msg.contains("DRM"));
    }

    #[test]
    fn test_book_error_open_display() {
        let msg = BookError::open("missing container.xml").to_string();
        assert!(msg.contains("cannot open book: missing container.xml"));
        assert!(msg.contains("Suggestion"));
    }
}
