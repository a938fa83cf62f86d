//! Link resolution: turning shared e-book links into fetchable URLs.
//!
//! A reference pasted by a reader (a GitHub page, a Google Drive share link,
//! an arbitrary URL, or a base64 token wrapping one of those) is rarely
//! something a browser-side fetch can retrieve directly. This module rewrites
//! it through an ordered table of link rules and, where the target host does
//! not grant cross-origin access, wraps it through a CORS relay.
//!
//! # Architecture
//!
//! - [`LinkRule`] - Trait each rule implements (predicate + transform)
//! - [`LinkResolver`] - Priority-ordered rule table with the resolution pass
//! - [`ResolveStep`] - Tagged result of a single rule
//! - [`GithubBlobRule`] - Rewrites `github.com/.../blob/...` pages to raw content
//! - [`DriveShareRule`] - Rewrites Drive share links to export-download URLs
//! - [`RelayRule`] - Fallback that routes everything else through the relay
//! - [`CorsRelay`] - The relay endpoint and its single-encoding wrapper
//!
//! Resolution is pure: no I/O, no shared mutable state. A resolver can be
//! shared freely between threads.
//!
//! # Example
//!
//! ```
//! use bookfetch_core::resolver::{ResolverSettings, build_default_link_resolver};
//!
//! let resolver = build_default_link_resolver(&ResolverSettings::default());
//! let target = resolver
//!     .resolve("https://github.com/user/repo/blob/main/book.epub")
//!     .unwrap();
//! assert_eq!(target.url, "https://raw.githubusercontent.com/user/repo/main/book.epub");
//! assert!(resolver.resolve("").is_none());
//! ```

mod decode;
mod drive;
mod error;
mod github;
mod registry;
mod relay;
pub(crate) mod utils;

pub use decode::decode_reference;
pub use drive::{DriveShareRule, extract_drive_id};
pub use error::ResolveError;
pub use github::{GithubBlobRule, GithubPolicy};
pub use registry::LinkResolver;
pub use relay::{CorsRelay, DEFAULT_RELAY_ENDPOINT, RelayRule};
pub use utils::encode_component;

use serde::Serialize;

/// Immutable policy the default rule table is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    /// CORS relay endpoint; the encoded target is appended verbatim.
    pub relay_endpoint: String,
    /// How GitHub blob links are rewritten.
    pub github_policy: GithubPolicy,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            relay_endpoint: DEFAULT_RELAY_ENDPOINT.to_string(),
            github_policy: GithubPolicy::default(),
        }
    }
}

/// Builds the default rule table used by the CLI.
///
/// Order is deterministic: provider rules first (GitHub, then Drive), the
/// relay fallback last.
#[must_use]
pub fn build_default_link_resolver(settings: &ResolverSettings) -> LinkResolver {
    let mut resolver = LinkResolver::new(CorsRelay::new(settings.relay_endpoint.clone()));
    resolver.register(Box::new(GithubBlobRule::new(settings.github_policy)));
    resolver.register(Box::new(DriveShareRule::new()));
    resolver.register(Box::new(RelayRule::new()));
    resolver
}

/// Priority level for rule ordering.
///
/// Rules are tried in priority order: Provider first, then Fallback.
/// Within the same level, rules are tried in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RulePriority {
    /// Host-specific rewrites (GitHub, Google Drive)
    Provider = 0,
    /// Catch-all relay wrapping
    Fallback = 1,
}

/// Result of a single rule's attempt on a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveStep {
    /// Final URL, fetched as-is.
    Direct(String),
    /// Final once wrapped by the CORS relay.
    Relay(String),
    /// The rule cannot produce a URL for this reference; try the next one.
    Declined(ResolveError),
}

/// A resolved, directly fetchable target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchTarget {
    /// URL to issue the GET against.
    pub url: String,
    /// Name of the rule that produced `url`.
    pub rule: String,
    /// Whether `url` goes through the CORS relay.
    pub relayed: bool,
    /// The reference after base64 pre-decoding.
    pub reference: String,
}

/// A single entry of the link rule table.
///
/// `can_handle` is a cheap predicate; `resolve` may still decline after
/// closer inspection, in which case resolution moves to the next rule.
pub trait LinkRule: Send + Sync {
    /// Returns the rule's name (e.g. "github", "drive", "relay").
    fn name(&self) -> &str;

    /// Returns the rule's priority level.
    fn priority(&self) -> RulePriority;

    /// Returns true if this rule claims the (decoded) reference.
    fn can_handle(&self, reference: &str) -> bool;

    /// Rewrites the reference.
    fn resolve(&self, reference: &str) -> ResolveStep;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_priority_ordering() {
        assert!(RulePriority::Provider < RulePriority::Fallback);
    }

    #[test]
    fn test_resolver_settings_default() {
        let settings = ResolverSettings::default();
        assert_eq!(settings.relay_endpoint, "https://corsproxy.io/?");
        assert_eq!(settings.github_policy, GithubPolicy::Raw);
    }

    #[test]
    fn test_default_resolver_registers_three_rules_in_order() {
        let resolver = build_default_link_resolver(&ResolverSettings::default());
        let names: Vec<&str> = resolver
            .rules_for("https://github.com/u/r/blob/main/b.epub")
            .iter()
            .map(|rule| rule.name())
            .collect();
        assert_eq!(names, vec!["github", "relay"]);
        assert_eq!(resolver.rule_count(), 3);
    }

    #[test]
    fn test_fetch_target_serializes_for_json_output() {
        let target = FetchTarget {
            url: "https://corsproxy.io/?x".to_string(),
            rule: "relay".to_string(),
            relayed: true,
            reference: "x".to_string(),
        };
        let json = serde_json::to_value(&target).unwrap_or_default();
        assert_eq!(json["rule"], "relay");
        assert_eq!(json["relayed"], true);
    }
}
