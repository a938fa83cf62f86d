//! Book fetching: download a resolved target and check it is an EPUB.
//!
//! # Overview
//!
//! - [`BookClient`] - reqwest client with timeouts, size limits and validation
//! - [`FetchedBook`] - in-memory result of [`BookClient::fetch`]
//! - [`SavedBook`] - on-disk result of [`BookClient::fetch_to_file`]
//! - [`FetchError`] - structured failure reasons
//!
//! A fetch is one GET with no retry. The whole body is buffered, then checked
//! for a minimum size and the ZIP local file header every EPUB starts with;
//! relays that answer `200` with an HTML error page fail the second check.

mod client;
pub mod constants;
mod error;
mod filename;

pub use client::{BookClient, FetchSettings, FetchedBook, SavedBook};
pub use constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_BOOK_FILENAME, DEFAULT_MAX_BOOK_BYTES, DEFAULT_MIN_BOOK_BYTES,
    READ_TIMEOUT_SECS, ZIP_SIGNATURE,
};
pub use error::FetchError;
pub use filename::filename_from_reference;
