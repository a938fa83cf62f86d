//! User-Agent string for book requests.
//!
//! Relays and file hosts see this header; it names the tool and version so
//! operators can tell bookfetch traffic apart (RFC 9308).

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/bookfetch";

/// Default User-Agent for fetch requests.
#[must_use]
pub(crate) fn default_fetch_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("bookfetch/{version} (epub-reader; +{PROJECT_UA_URL})")
}
