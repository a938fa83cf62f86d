//! Constants for the fetch module (timeouts, size limits, archive signature).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for slow relays).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Bodies shorter than this are treated as a broken link rather than a book.
pub const DEFAULT_MIN_BOOK_BYTES: u64 = 1000;

/// Upper bound on a buffered book body (200 MiB).
pub const DEFAULT_MAX_BOOK_BYTES: u64 = 200 * 1024 * 1024;

/// ZIP local file header; every EPUB container starts with it.
pub const ZIP_SIGNATURE: [u8; 4] = *b"PK\x03\x04";

/// Filename used when the reference has no usable last path segment.
pub const DEFAULT_BOOK_FILENAME: &str = "book.epub";

/// Attempts at claiming a fresh output name when others appear concurrently.
pub const MAX_SAVE_ATTEMPTS: usize = 8;
