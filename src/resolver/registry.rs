//! Link rule table with the priority-ordered resolution pass.
//!
//! The [`LinkResolver`] owns the rules and the relay, pre-decodes opaque
//! references, and walks the rules until one produces a URL.

use tracing::{debug, info, warn};

use super::decode::decode_reference;
use super::{CorsRelay, FetchTarget, LinkRule, ResolveStep};

/// A priority-ordered collection of link rules.
///
/// Rules are tried in priority order (Provider, then Fallback). Within the
/// same priority level, rules are tried in registration order.
pub struct LinkResolver {
    rules: Vec<Box<dyn LinkRule>>,
    relay: CorsRelay,
}

impl LinkResolver {
    /// Creates an empty rule table that relays through `relay`.
    #[must_use]
    pub fn new(relay: CorsRelay) -> Self {
        Self {
            rules: Vec::new(),
            relay,
        }
    }

    /// Registers a rule with the table.
    #[tracing::instrument(skip(self, rule), fields(rule_name))]
    pub fn register(&mut self, rule: Box<dyn LinkRule>) {
        tracing::Span::current().record("rule_name", rule.name());
        debug!(
            name = rule.name(),
            priority = ?rule.priority(),
            "Registering link rule"
        );
        self.rules.push(rule);
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the relay used for `Relay` steps.
    #[must_use]
    pub fn relay(&self) -> &CorsRelay {
        &self.relay
    }

    /// Returns all rules claiming the (already decoded) reference, in the
    /// order they will be tried.
    #[must_use]
    pub fn rules_for(&self, reference: &str) -> Vec<&dyn LinkRule> {
        let mut rules: Vec<&dyn LinkRule> = self
            .rules
            .iter()
            .filter(|rule| rule.can_handle(reference))
            .map(AsRef::as_ref)
            .collect();
        rules.sort_by_key(|rule| rule.priority());
        rules
    }

    /// Resolves a raw reference into a fetch target.
    ///
    /// 1. Empty input returns `None`; nothing is built. Any other input is
    ///    used exactly as given, surrounding whitespace included.
    /// 2. The reference is base64-decoded when it is not a web URL (fail open).
    /// 3. Claiming rules are tried in priority order; `Declined` moves on.
    /// 4. `Relay` results are wrapped through the relay exactly once.
    ///
    /// If no rule produces a URL (only possible with a custom table that lacks
    /// a fallback), the reference is relayed as-is, so a non-empty reference
    /// always resolves to something.
    #[must_use]
    #[tracing::instrument(skip(self, raw), fields(raw_len = raw.len()))]
    pub fn resolve(&self, raw: &str) -> Option<FetchTarget> {
        if raw.is_empty() {
            debug!("empty reference; nothing to resolve");
            return None;
        }

        let reference = decode_reference(raw).into_owned();

        for rule in self.rules_for(&reference) {
            match rule.resolve(&reference) {
                ResolveStep::Direct(url) => {
                    info!(rule = rule.name(), url = %url, "Resolved link");
                    return Some(FetchTarget {
                        url,
                        rule: rule.name().to_string(),
                        relayed: false,
                        reference,
                    });
                }
                ResolveStep::Relay(target) => {
                    let url = self.relay.wrap(&target);
                    info!(rule = rule.name(), target = %target, url = %url, "Resolved link via relay");
                    return Some(FetchTarget {
                        url,
                        rule: rule.name().to_string(),
                        relayed: true,
                        reference,
                    });
                }
                ResolveStep::Declined(err) => {
                    debug!(rule = rule.name(), error = %err, "Rule declined, trying next");
                }
            }
        }

        warn!(reference = %reference, "No link rule produced a URL; relaying as-is");
        Some(FetchTarget {
            url: self.relay.wrap(&reference),
            rule: "relay".to_string(),
            relayed: true,
            reference,
        })
    }
}

impl std::fmt::Debug for LinkResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.rules.iter().map(|rule| rule.name()).collect();
        f.debug_struct("LinkResolver")
            .field("rule_count", &self.rules.len())
            .field("rules", &names)
            .field("relay", &self.relay.endpoint())
            .finish()
    }
}

impl Default for LinkResolver {
    fn default() -> Self {
        Self::new(CorsRelay::default())
    }
}
