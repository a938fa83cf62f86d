//! Opaque-token pre-decoding.
//!
//! Reader links often carry the book URL base64-encoded in the query string
//! so it survives chat clients and link shorteners. Anything that does not
//! already look like a web URL gets one decode attempt; on failure the
//! reference is used unchanged.

use std::borrow::Cow;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use tracing::debug;

use super::utils::has_web_scheme;

const LENIENT_PADDING: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT_PADDING);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT_PADDING);

/// Decodes a base64-wrapped reference, or returns it unchanged.
///
/// References starting with `http://` or `https://` are never decoded. Other
/// input is tried against the standard alphabet, then the URL-safe one, with
/// optional padding. The decoded bytes must be non-empty UTF-8.
///
/// # Examples
///
/// ```
/// use bookfetch_core::resolver::decode_reference;
///
/// assert_eq!(
///     decode_reference("aHR0cHM6Ly9leGFtcGxlLmNvbS9ib29rLmVwdWI="),
///     "https://example.com/book.epub"
/// );
/// assert_eq!(decode_reference("example.com/book.epub"), "example.com/book.epub");
/// ```
#[must_use]
pub fn decode_reference(raw: &str) -> Cow<'_, str> {
    if raw.is_empty() || has_web_scheme(raw) {
        return Cow::Borrowed(raw);
    }

    match decode_token(raw) {
        Some(decoded) => {
            debug!(decoded = %decoded, "decoded base64 reference");
            Cow::Owned(decoded)
        }
        None => {
            debug!(reference = %raw, "reference is not base64; using it as-is");
            Cow::Borrowed(raw)
        }
    }
}

fn decode_token(token: &str) -> Option<String> {
    // Query-string decoding turns '+' into ' '; spaces are never base64.
    let token = token.replace(' ', "+");
    let bytes = STANDARD_LENIENT
        .decode(&token)
        .or_else(|_| URL_SAFE_LENIENT.decode(&token))
        .ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
