//! GitHub blob-link rule.
//!
//! `https://github.com/<owner>/<repo>/blob/<ref>/<path>` is an HTML page, not
//! the file. The rule rewrites it to a content host according to
//! [`GithubPolicy`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::parser::ParseError;

use super::utils::{canonical_host, parse_lenient};
use super::{LinkRule, ResolveError, ResolveStep, RulePriority};

const GITHUB_HOST: &str = "github.com";
const RAW_CONTENT_BASE: &str = "https://raw.githubusercontent.com";
const JSDELIVR_GH_BASE: &str = "https://cdn.jsdelivr.net/gh";
const BLOB_SEGMENT: &str = "/blob/";

/// How GitHub blob links are turned into fetchable URLs.
///
/// The choice matters operationally: raw content is served with permissive
/// CORS headers but is rate limited per client, the relay adds a hop with its
/// own limits, and jsDelivr caches aggressively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GithubPolicy {
    /// `raw.githubusercontent.com`, fetched directly.
    #[default]
    Raw,
    /// `raw.githubusercontent.com`, wrapped through the CORS relay.
    RawRelayed,
    /// `cdn.jsdelivr.net/gh/<owner>/<repo>@<ref>/<path>`, fetched directly.
    Jsdelivr,
}

impl GithubPolicy {
    /// Returns the stable label used in config files and CLI flags.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::RawRelayed => "raw-relayed",
            Self::Jsdelivr => "jsdelivr",
        }
    }
}

impl fmt::Display for GithubPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GithubPolicy {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "raw-relayed" | "raw_relayed" => Ok(Self::RawRelayed),
            "jsdelivr" => Ok(Self::Jsdelivr),
            _ => Err(ParseError::invalid_value(
                "github_policy",
                value,
                "raw, raw-relayed, jsdelivr",
            )),
        }
    }
}

/// Provider rule for `github.com/.../blob/...` links.
#[derive(Debug, Default)]
pub struct GithubBlobRule {
    policy: GithubPolicy,
}

impl GithubBlobRule {
    /// Creates a rule applying `policy` to every GitHub blob link.
    #[must_use]
    pub fn new(policy: GithubPolicy) -> Self {
        Self { policy }
    }

    /// Returns the configured policy.
    #[must_use]
    pub fn policy(&self) -> GithubPolicy {
        self.policy
    }
}

impl LinkRule for GithubBlobRule {
    fn name(&self) -> &'static str {
        "github"
    }

    fn priority(&self) -> RulePriority {
        RulePriority::Provider
    }

    fn can_handle(&self, reference: &str) -> bool {
        split_blob_path(reference).is_some()
    }

    #[tracing::instrument(skip(self), fields(rule = "github", policy = %self.policy))]
    fn resolve(&self, reference: &str) -> ResolveStep {
        let Some((repo, rest)) = split_blob_path(reference) else {
            return ResolveStep::Declined(ResolveError::rewrite_failed(
                reference,
                "not a github.com link with a /blob/ segment",
            ));
        };
        if repo.trim_matches('/').split('/').count() < 2 || rest.is_empty() {
            return ResolveStep::Declined(ResolveError::rewrite_failed(
                reference,
                "expected /<owner>/<repo>/blob/<ref>/<path>",
            ));
        }

        debug!(repo = %repo, path = %rest, "rewriting GitHub blob link");
        match self.policy {
            GithubPolicy::Raw => ResolveStep::Direct(format!("{RAW_CONTENT_BASE}{repo}/{rest}")),
            GithubPolicy::RawRelayed => {
                ResolveStep::Relay(format!("{RAW_CONTENT_BASE}{repo}/{rest}"))
            }
            GithubPolicy::Jsdelivr => ResolveStep::Direct(format!("{JSDELIVR_GH_BASE}{repo}@{rest}")),
        }
    }
}

/// Splits a GitHub blob link into (`/<owner>/<repo>`, `<ref>/<path>`).
///
/// Query and fragment (`?raw=true`, `#L10`) are dropped; the path stays in its
/// already-encoded form.
fn split_blob_path(reference: &str) -> Option<(String, String)> {
    let url = parse_lenient(reference)?;
    if canonical_host(url.host_str()?) != GITHUB_HOST {
        return None;
    }
    let (repo, rest) = url.path().split_once(BLOB_SEGMENT)?;
    Some((repo.to_string(), rest.to_string()))
}
