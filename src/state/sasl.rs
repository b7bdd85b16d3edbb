//! SASL session table.
//!
//! Tracks each in-progress SASL negotiation between a local unregistered
//! client and the services peer. The table has fixed capacity and fails
//! closed; per-session counters bound both client chatter and failed
//! attempts. Sessions are keyed by client connection id and cleaned up on
//! client exit.

use crate::state::ClientId;
use std::time::Instant;

/// Maximum number of concurrent SASL sessions.
pub const SASL_MAX_SESSIONS: usize = 256;
/// Maximum client AUTHENTICATE continuations per session.
pub const SASL_MAX_MESSAGES: u32 = 20;
/// Maximum failed outcomes before the session is torn down.
pub const SASL_MAX_FAILURES: u32 = 3;

/// One in-progress SASL negotiation.
#[derive(Debug)]
pub struct SaslSession {
    /// The local client performing SASL.
    pub client: ClientId,
    /// UID of the services agent handling this session; empty until the
    /// first `C` response binds it.
    agent: String,
    /// Client AUTHENTICATE continuations seen (mechanism selection and
    /// aborts excluded).
    pub messages: u32,
    /// Failed outcomes seen for this session.
    pub failures: u32,
    /// When the session was created. Recorded for operator tooling; the
    /// relay itself never consults it.
    pub started_at: Instant,
    /// True once a success outcome has been processed.
    pub complete: bool,
}

impl SaslSession {
    fn new(client: ClientId) -> Self {
        Self {
            client,
            agent: String::new(),
            messages: 0,
            failures: 0,
            started_at: Instant::now(),
            complete: false,
        }
    }

    /// The bound agent UID, if any.
    pub fn agent(&self) -> Option<&str> {
        if self.agent.is_empty() {
            None
        } else {
            Some(&self.agent)
        }
    }

    /// The agent UID for outbound relay messages: the bound agent, or the
    /// `*` placeholder before binding.
    pub fn agent_or_placeholder(&self) -> &str {
        if self.agent.is_empty() {
            "*"
        } else {
            &self.agent
        }
    }

    /// Bind the services agent. One-shot: a second bind is ignored, the
    /// first agent keeps the session.
    pub fn bind_agent(&mut self, agent: &str) {
        debug_assert!(self.agent.is_empty(), "agent rebound within a session");
        if self.agent.is_empty() {
            self.agent = agent.to_string();
        }
    }
}

/// Fixed-capacity registry of in-progress SASL sessions.
///
/// At most one session exists per client. All mutation happens from the
/// daemon's event-dispatch context; the table itself does no locking.
#[derive(Debug)]
pub struct SessionTable {
    slots: Vec<Option<SaslSession>>,
}

impl SessionTable {
    /// Create an empty table with `SASL_MAX_SESSIONS` slots.
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(SASL_MAX_SESSIONS);
        slots.resize_with(SASL_MAX_SESSIONS, || None);
        Self { slots }
    }

    /// Find the session for a client.
    pub fn find(&self, client: ClientId) -> Option<&SaslSession> {
        self.slots
            .iter()
            .filter_map(Option::as_ref)
            .find(|s| s.client == client)
    }

    /// Find the session for a client, mutably.
    pub fn find_mut(&mut self, client: ClientId) -> Option<&mut SaslSession> {
        self.slots
            .iter_mut()
            .filter_map(Option::as_mut)
            .find(|s| s.client == client)
    }

    /// Allocate a cleared session bound to `client`.
    ///
    /// Returns `None` when every slot is occupied: creation beyond
    /// capacity fails closed. Callers must have checked [`find`] first;
    /// at most one session may exist per client.
    ///
    /// [`find`]: SessionTable::find
    pub fn allocate(&mut self, client: ClientId) -> Option<&mut SaslSession> {
        debug_assert!(self.find(client).is_none(), "duplicate session for client");
        let slot = self.slots.iter_mut().find(|s| s.is_none())?;
        *slot = Some(SaslSession::new(client));
        slot.as_mut()
    }

    /// Clear the session for a client, freeing its slot.
    ///
    /// Returns the cleared session, or `None` if the client had none.
    pub fn clear(&mut self, client: ClientId) -> Option<SaslSession> {
        self.slots
            .iter_mut()
            .find(|s| s.as_ref().is_some_and(|sess| sess.client == client))
            .and_then(Option::take)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Zero every slot. Used by module teardown.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::new()
    }
}
