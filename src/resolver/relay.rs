//! CORS relay wrapping and the catch-all relay rule.

use tracing::trace;

use super::utils::encode_component;
use super::{LinkRule, ResolveStep, RulePriority};

/// Public relay used when no endpoint is configured.
pub const DEFAULT_RELAY_ENDPOINT: &str = "https://corsproxy.io/?";

/// A CORS-relaxing relay addressed by appending the encoded target URL.
///
/// The endpoint is used as a literal prefix, so it must already end with the
/// query syntax the relay expects (`https://corsproxy.io/?`,
/// `https://api.allorigins.win/raw?url=`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsRelay {
    endpoint: String,
}

impl CorsRelay {
    /// Creates a relay for the given endpoint prefix.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Returns the endpoint prefix.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Wraps `target` as a single percent-encoded parameter of the relay.
    #[must_use]
    pub fn wrap(&self, target: &str) -> String {
        let wrapped = format!("{}{}", self.endpoint, encode_component(target));
        trace!(target_url = %target, wrapped = %wrapped, "wrapped through relay");
        wrapped
    }

    /// Recovers the target from a URL produced by [`wrap`](Self::wrap).
    ///
    /// Returns `None` when `wrapped` does not start with this relay's
    /// endpoint or does not decode to UTF-8.
    #[must_use]
    pub fn unwrap_target(&self, wrapped: &str) -> Option<String> {
        let encoded = wrapped.strip_prefix(self.endpoint.as_str())?;
        urlencoding::decode(encoded).ok().map(std::borrow::Cow::into_owned)
    }
}

impl Default for CorsRelay {
    fn default() -> Self {
        Self::new(DEFAULT_RELAY_ENDPOINT)
    }
}

/// Fallback rule: every reference not claimed by a provider rule is relayed.
///
/// Arbitrary hosts never get a "fetch directly" branch.
#[derive(Debug, Default)]
pub struct RelayRule;

impl RelayRule {
    /// Creates a new `RelayRule`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LinkRule for RelayRule {
    fn name(&self) -> &'static str {
        "relay"
    }

    fn priority(&self) -> RulePriority {
        RulePriority::Fallback
    }

    fn can_handle(&self, _reference: &str) -> bool {
        true
    }

    fn resolve(&self, reference: &str) -> ResolveStep {
        ResolveStep::Relay(reference.to_string())
    }
}
