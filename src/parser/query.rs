//! Reference extraction from reader page URLs.
//!
//! Reader pages are opened as `.../reader?url=<reference>`. The reference is
//! pulled out the same way a browser-side `getUrlParameter` helper would:
//! first `[?&]name=` match, value up to `&` or `#`, `+` as space, then one
//! percent-decode.

use regex::Regex;
use tracing::{debug, trace};
use url::Url;

use crate::resolver::decode_reference;

/// Query parameter carrying the book reference.
pub const DEFAULT_REFERENCE_PARAM: &str = "url";

/// Extracts the `name` parameter from a page URL or query string.
///
/// Accepts `https://host/page?url=...`, `?url=...`, or `url=...`. Returns an
/// empty string when the parameter is missing.
///
/// # Examples
///
/// ```
/// use bookfetch_core::parser::reference_from_query;
///
/// assert_eq!(
///     reference_from_query("https://reader.example/?url=https%3A%2F%2Fx.org%2Fa+b.epub", "url"),
///     "https://x.org/a b.epub"
/// );
/// assert_eq!(reference_from_query("?theme=dark", "url"), "");
/// ```
#[must_use]
#[tracing::instrument(skip(page), fields(page_len = page.len()))]
pub fn reference_from_query(page: &str, name: &str) -> String {
    let search = search_part(page.trim());
    let pattern = format!(r"[?&]{}=([^&#]*)", regex::escape(name));
    let Ok(regex) = Regex::new(&pattern) else {
        return String::new();
    };

    let Some(raw) = regex
        .captures(&search)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().replace('+', " ")))
    else {
        trace!(param = name, "parameter not present");
        return String::new();
    };

    match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            debug!(param = name, error = %e, "parameter is not valid percent-encoded UTF-8; using raw value");
            raw
        }
    }
}

/// Returns the query part of `page` with a leading `?`.
fn search_part(page: &str) -> String {
    if let Ok(url) = Url::parse(page)
        && url.has_host()
    {
        return url
            .query()
            .map(|query| format!("?{query}"))
            .unwrap_or_default();
    }
    let without_fragment = page.split('#').next().unwrap_or_default();
    match without_fragment.find('?') {
        Some(index) => without_fragment[index..].to_string(),
        None => format!("?{without_fragment}"),
    }
}

/// Extracts the reference parameter and applies base64 pre-decoding.
///
/// Convenience for callers that only need the decoded reference string
/// (for example to derive a filename) without resolving it.
#[must_use]
pub fn decoded_reference_from_query(page: &str, name: &str) -> String {
    let raw = reference_from_query(page, name);
    decode_reference(&raw).into_owned()
}
