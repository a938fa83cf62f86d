//! bookfetch core library
//!
//! Resolves shared e-book links (GitHub blob pages, Google Drive share links,
//! base64-wrapped tokens, plain URLs) into URLs a reader can fetch, and
//! downloads, validates and reads the resulting EPUB.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`resolver`] - Link rule table, base64 pre-decoding, CORS relay wrapping
//! - [`parser`] - Reference extraction from reader page URLs, setting validation
//! - [`fetch`] - HTTP download with size and archive validation
//! - [`book`] - Plain-text extraction from a fetched EPUB's spine
//! - [`preferences`] - Reader display settings and renderer options

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod book;
pub mod fetch;
pub mod parser;
pub mod preferences;
pub mod resolver;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use book::{BookError, ExtractedBook, extract_text};
pub use fetch::{BookClient, FetchError, FetchSettings, FetchedBook, SavedBook};
pub use parser::{ParseError, reference_from_query, validate_relay_endpoint};
pub use preferences::{Flow, ReaderPreferences, RenditionOptions, Theme, ThemeRules};
pub use resolver::{
    CorsRelay, FetchTarget, GithubPolicy, LinkResolver, LinkRule, ResolveError, ResolveStep,
    ResolverSettings, RulePriority, build_default_link_resolver, decode_reference,
};
