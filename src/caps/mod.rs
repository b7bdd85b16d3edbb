//! Capability advertisement registry.
//!
//! Holds the capability tokens the host offers during CAP negotiation.
//! The CAP machinery itself lives in the host daemon; modules register
//! and unregister tokens here, and the host renders [`ls_tokens`] into
//! `CAP LS` lines.
//!
//! [`ls_tokens`]: CapRegistry::ls_tokens

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Registry of advertised capability tokens.
///
/// Registration is idempotent: registering an existing name replaces its
/// value, which is how the mechanism list of `sasl` is updated when
/// services report theirs.
#[derive(Debug, Default)]
pub struct CapRegistry {
    tokens: RwLock<BTreeMap<String, Option<String>>>,
}

impl CapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a capability, with an optional `name=value` payload.
    pub fn register(&self, name: &str, value: Option<&str>) {
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        debug!(cap = %name, value = ?value, "capability registered");
        tokens.insert(name.to_string(), value.map(str::to_string));
    }

    /// Remove a capability. Returns whether it was advertised.
    pub fn unregister(&self, name: &str) -> bool {
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        tokens.remove(name).is_some()
    }

    /// The advertised value of a capability: `None` if the capability is
    /// not advertised, `Some(None)` if advertised without a value.
    pub fn value_of(&self, name: &str) -> Option<Option<String>> {
        let tokens = self.tokens.read().unwrap_or_else(PoisonError::into_inner);
        tokens.get(name).cloned()
    }

    /// Tokens for a `CAP LS` reply, `name` or `name=value` form.
    pub fn ls_tokens(&self) -> Vec<String> {
        let tokens = self.tokens.read().unwrap_or_else(PoisonError::into_inner);
        tokens
            .iter()
            .map(|(name, value)| match value {
                Some(v) => format!("{}={}", name, v),
                None => name.clone(),
            })
            .collect()
    }
}
