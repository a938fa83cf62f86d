//! Shared utilities for link rules: host normalization, lenient URL parsing, and encoding.

use url::Url;

/// Normalizes a host string: trim, strip leading "www.", trailing '.', and lowercases.
#[must_use]
pub fn canonical_host(host: &str) -> String {
    host.trim()
        .trim_start_matches("www.")
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

/// Returns true if `value` starts with `http://` or `https://`, ignoring ASCII case.
#[must_use]
pub fn has_web_scheme(value: &str) -> bool {
    starts_with_ignore_case(value, "http://") || starts_with_ignore_case(value, "https://")
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Parses a reference as a URL, assuming `https://` when no scheme is present.
///
/// Shared links are often pasted without a scheme (`github.com/owner/repo/...`),
/// so host rules still get a chance to claim them.
#[must_use]
pub fn parse_lenient(reference: &str) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    if has_web_scheme(trimmed) {
        return Url::parse(trimmed).ok();
    }
    if trimmed.contains("://") {
        return None;
    }
    Url::parse(&format!("https://{trimmed}")).ok()
}

/// Returns the canonical host of `reference` when it parses as a web URL.
#[must_use]
pub fn reference_host(reference: &str) -> Option<String> {
    parse_lenient(reference).and_then(|url| url.host_str().map(canonical_host))
}

/// Percent-encodes a value for embedding as a single query component.
///
/// Only `A-Z a-z 0-9 - _ . ~` pass through; every other byte becomes `%XX`.
/// Decoding the result once yields `value` exactly.
#[must_use]
pub fn encode_component(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
