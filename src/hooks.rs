//! Client-exit hooks.
//!
//! The host daemon runs every installed hook when a local client
//! disconnects, before the client record is dropped. The SASL relay
//! installs [`SaslExitHook`] so a disconnect mid-negotiation tells the
//! services agent to stand down.

use crate::state::{Client, Core};
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock as StdRwLock};
use tokio::sync::RwLock;
use tracing::debug;

/// A hook run when a local client exits.
#[async_trait]
pub trait ClientExitHook: Send + Sync {
    async fn on_client_exit(&self, core: &Arc<Core>, client: Arc<RwLock<Client>>);
}

/// Registry of installed client-exit hooks, keyed by name so module
/// teardown can uninstall what it installed.
#[derive(Default)]
pub struct HookRegistry {
    hooks: StdRwLock<Vec<(&'static str, Arc<dyn ClientExitHook>)>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a hook under a name, replacing any previous hook with the
    /// same name.
    pub fn install(&self, name: &'static str, hook: Arc<dyn ClientExitHook>) {
        let mut hooks = self.hooks.write().unwrap_or_else(PoisonError::into_inner);
        hooks.retain(|(existing, _)| *existing != name);
        hooks.push((name, hook));
    }

    /// Uninstall a hook by name. Returns whether it was installed.
    pub fn uninstall(&self, name: &str) -> bool {
        let mut hooks = self.hooks.write().unwrap_or_else(PoisonError::into_inner);
        let before = hooks.len();
        hooks.retain(|(existing, _)| *existing != name);
        hooks.len() != before
    }

    /// Run every installed hook for a departing client.
    pub async fn run_client_exit(&self, core: &Arc<Core>, client: Arc<RwLock<Client>>) {
        let hooks: Vec<Arc<dyn ClientExitHook>> = {
            let hooks = self.hooks.read().unwrap_or_else(PoisonError::into_inner);
            hooks.iter().map(|(_, hook)| hook.clone()).collect()
        };
        for hook in hooks {
            hook.on_client_exit(core, client.clone()).await;
        }
    }
}

/// Cleans up a SASL session when its client disconnects.
///
/// If the session had bound an agent and the client had a UID, services
/// are told about the abort; either way the slot is freed. Exit after the
/// session was already cleared is a no-op.
pub struct SaslExitHook;

#[async_trait]
impl ClientExitHook for SaslExitHook {
    async fn on_client_exit(&self, core: &Arc<Core>, client: Arc<RwLock<Client>>) {
        let (client_id, uid) = {
            let client = client.read().await;
            (client.id, client.uid.clone())
        };

        let cleared = {
            let mut sessions = core.sessions();
            sessions
                .clear(client_id)
                .map(|session| session.agent().map(str::to_string))
        };

        let Some(bound_agent) = cleared else {
            return;
        };
        debug!(client = client_id, "SASL session cleared on client exit");

        if let Some(agent) = bound_agent {
            if !uid.is_empty() {
                core.send_to_servers(core.encap_sasl(&uid, &agent, "D", &["A"]))
                    .await;
            }
        }
    }
}
