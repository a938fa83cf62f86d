//! Google Drive share-link rule.
//!
//! Drive share pages (`/file/d/<id>/view`, `/open?id=<id>`, `/uc?id=<id>`)
//! are rewritten to the export-download endpoint. That endpoint never grants
//! cross-origin access, so the result always goes through the relay.

use tracing::debug;

use super::utils::{encode_component, parse_lenient, reference_host};
use super::{LinkRule, ResolveError, ResolveStep, RulePriority};

const DRIVE_HOST: &str = "drive.google.com";
const DRIVE_EXPORT_BASE: &str = "https://drive.google.com/uc?export=download&id=";

/// Provider rule for `drive.google.com` links.
#[derive(Debug, Default)]
pub struct DriveShareRule;

impl DriveShareRule {
    /// Creates a new `DriveShareRule`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LinkRule for DriveShareRule {
    fn name(&self) -> &'static str {
        "drive"
    }

    fn priority(&self) -> RulePriority {
        RulePriority::Provider
    }

    fn can_handle(&self, reference: &str) -> bool {
        reference_host(reference).is_some_and(|host| host == DRIVE_HOST)
    }

    #[tracing::instrument(skip(self), fields(rule = "drive"))]
    fn resolve(&self, reference: &str) -> ResolveStep {
        match extract_drive_id(reference) {
            Some(id) => {
                debug!(id = %id, "extracted Drive file id");
                ResolveStep::Relay(format!("{DRIVE_EXPORT_BASE}{}", encode_component(&id)))
            }
            None => ResolveStep::Declined(ResolveError::no_identifier(reference, "Google Drive")),
        }
    }
}

/// Extracts a Drive file identifier from a share link.
///
/// A `/d/<id>` path segment wins over an `id=<id>` query parameter; some links
/// carry both. The returned id is percent-decoded so callers encode it once.
///
/// # Examples
///
/// ```
/// use bookfetch_core::resolver::extract_drive_id;
///
/// assert_eq!(
///     extract_drive_id("https://drive.google.com/file/d/ABC123/view?usp=sharing").as_deref(),
///     Some("ABC123")
/// );
/// assert_eq!(
///     extract_drive_id("https://drive.google.com/open?id=XYZ").as_deref(),
///     Some("XYZ")
/// );
/// ```
#[must_use]
pub fn extract_drive_id(reference: &str) -> Option<String> {
    let url = parse_lenient(reference)?;
    id_from_path(&url).or_else(|| id_from_query(&url))
}

fn id_from_path(url: &url::Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    let position = segments.iter().position(|segment| *segment == "d")?;
    let raw = segments.get(position + 1).filter(|segment| !segment.is_empty())?;
    Some(
        urlencoding::decode(raw)
            .map_or_else(|_| (*raw).to_string(), std::borrow::Cow::into_owned),
    )
}

fn id_from_query(url: &url::Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, value)| key == "id" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}
