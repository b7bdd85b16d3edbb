//! Central shared state for the daemon side of the relay.
//!
//! [`Core`] is the dependency container handlers work against: the client
//! registry and its UID index, the UID allocator, the capability registry,
//! the SASL session table, the command registry, exit hooks, and the send
//! primitives (per-client queues and the services link).
//!
//! # Lock discipline
//!
//! The session table sits behind a `std::sync::Mutex`. Guards are never
//! held across an `.await`: handlers decide under the lock, collect the
//! outbound messages, release, then send (collect-then-send).

use crate::caps::CapRegistry;
use crate::config::Config;
use crate::handlers::{Registry, Role, Source};
use crate::hooks::HookRegistry;
use crate::state::client::{Client, ClientId};
use crate::state::sasl::SessionTable;
use crate::state::uid::UidAllocator;
use dashmap::DashMap;
use relay_proto::{Command, Message, MessageRef, Prefix};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, trace};

/// Outgoing queue depth per client connection.
const CLIENT_QUEUE_DEPTH: usize = 64;
/// Outgoing queue depth of the services link.
const LINK_QUEUE_DEPTH: usize = 1024;

/// Central shared state.
pub struct Core {
    /// Daemon configuration.
    pub config: Config,
    /// Advertised capability tokens.
    pub caps: CapRegistry,
    /// Role-keyed command registry.
    pub registry: Registry,
    /// Client-exit hooks.
    pub hooks: HookRegistry,
    /// TS6 UID allocator for this server.
    pub uid_allocator: UidAllocator,
    sessions: Mutex<SessionTable>,
    clients: DashMap<ClientId, Arc<RwLock<Client>>>,
    by_uid: DashMap<String, ClientId>,
    next_client_id: AtomicU64,
    link_tx: mpsc::Sender<Message>,
}

impl Core {
    /// Create the core state.
    ///
    /// Returns the receiving end of the services link: everything the
    /// relay addresses to servers comes out of it.
    pub fn new(config: Config) -> (Arc<Core>, mpsc::Receiver<Message>) {
        let (link_tx, link_rx) = mpsc::channel(LINK_QUEUE_DEPTH);
        let uid_allocator = UidAllocator::new(config.server.sid.clone());
        let core = Arc::new(Core {
            config,
            caps: CapRegistry::new(),
            registry: Registry::new(),
            hooks: HookRegistry::new(),
            uid_allocator,
            sessions: Mutex::new(SessionTable::new()),
            clients: DashMap::new(),
            by_uid: DashMap::new(),
            next_client_id: AtomicU64::new(1),
            link_tx,
        });
        (core, link_rx)
    }

    /// This server's name, as used in numeric prefixes.
    pub fn server_name(&self) -> &str {
        &self.config.server.name
    }

    /// This server's SID, as used in encapsulated message prefixes.
    pub fn sid(&self) -> &str {
        &self.config.server.sid
    }

    /// Prefix for client-facing numerics.
    pub fn server_prefix(&self) -> Prefix {
        Prefix::ServerName(self.server_name().to_string())
    }

    // ------------------------------------------------------------------
    // Client registry
    // ------------------------------------------------------------------

    /// Attach a newly accepted local connection.
    ///
    /// Returns the connection id and the receiving end of the client's
    /// outgoing queue.
    pub fn attach_local_client(
        &self,
        host: &str,
        sockhost: &str,
    ) -> (ClientId, mpsc::Receiver<Message>) {
        let id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CLIENT_QUEUE_DEPTH);
        let client = Client {
            id,
            uid: String::new(),
            nick: None,
            username: String::new(),
            host: host.to_string(),
            sockhost: sockhost.to_string(),
            account: String::new(),
            caps: HashSet::new(),
            registered: false,
            is_service: false,
            sender: Some(tx),
        };
        self.clients.insert(id, Arc::new(RwLock::new(client)));
        trace!(client = id, host = %host, "local client attached");
        (id, rx)
    }

    /// Record a client learned from the network (no local connection).
    pub fn introduce_remote_user(&self, uid: &str, nick: &str, is_service: bool) -> ClientId {
        let id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
        let client = Client {
            id,
            uid: uid.to_string(),
            nick: Some(nick.to_string()),
            username: String::new(),
            host: String::new(),
            sockhost: String::new(),
            account: String::new(),
            caps: HashSet::new(),
            registered: true,
            is_service,
            sender: None,
        };
        self.clients.insert(id, Arc::new(RwLock::new(client)));
        self.by_uid.insert(uid.to_string(), id);
        id
    }

    /// Look up a client by connection id.
    pub fn client(&self, id: ClientId) -> Option<Arc<RwLock<Client>>> {
        self.clients.get(&id).map(|entry| entry.value().clone())
    }

    /// Resolve a UID to a connection id.
    pub fn client_id_by_uid(&self, uid: &str) -> Option<ClientId> {
        self.by_uid.get(uid).map(|entry| *entry.value())
    }

    /// Look up a client by UID.
    pub fn client_by_uid(&self, uid: &str) -> Option<Arc<RwLock<Client>>> {
        self.client_id_by_uid(uid).and_then(|id| self.client(id))
    }

    /// Whether a UID is present in the index.
    pub fn uid_in_use(&self, uid: &str) -> bool {
        self.by_uid.contains_key(uid)
    }

    /// Enter a freshly assigned UID into the index.
    ///
    /// Host code must not reassign a UID registered here; the relay hands
    /// out UIDs before registration completes so services can address the
    /// client.
    pub fn register_uid(&self, uid: &str, id: ClientId) {
        self.by_uid.insert(uid.to_string(), id);
    }

    /// Tear down a departing local client: run exit hooks, then drop the
    /// client from the registry and the UID index.
    pub async fn client_exited(self: &Arc<Self>, id: ClientId) {
        let Some(client) = self.client(id) else {
            return;
        };
        self.hooks.run_client_exit(self, client.clone()).await;

        let uid = client.read().await.uid.clone();
        if !uid.is_empty() {
            self.by_uid.remove(&uid);
        }
        self.clients.remove(&id);
        trace!(client = id, "client detached");
    }

    // ------------------------------------------------------------------
    // Session table
    // ------------------------------------------------------------------

    /// Lock the SASL session table.
    ///
    /// Guards must not be held across an `.await`.
    pub fn sessions(&self) -> MutexGuard<'_, SessionTable> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Send primitives (best-effort, fire-and-forget)
    // ------------------------------------------------------------------

    /// Queue a message to a local client.
    pub async fn send_to_client(&self, client: &Client, msg: Message) {
        if let Some(sender) = &client.sender {
            if sender.send(msg).await.is_err() {
                debug!(client = client.id, "client queue closed, message dropped");
            }
        }
    }

    /// Queue a message on the services link.
    pub async fn send_to_servers(&self, msg: Message) {
        if self.link_tx.send(msg).await.is_err() {
            debug!("services link closed, message dropped");
        }
    }

    /// Build an encapsulated SASL message addressed to all servers:
    /// `:<sid> ENCAP * SASL <uid> <agent> <kind> [data...]`.
    pub fn encap_sasl(&self, uid: &str, agent: &str, kind: &str, data: &[&str]) -> Message {
        let mut args = vec![uid.to_string(), agent.to_string(), kind.to_string()];
        args.extend(data.iter().map(|s| s.to_string()));
        Message {
            tags: None,
            prefix: Some(Prefix::ServerName(self.sid().to_string())),
            command: Command::ENCAP("*".to_string(), "SASL".to_string(), args),
        }
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Parse one line and dispatch it under the given role.
    ///
    /// Unparseable lines are dropped; the host's framing layer rejects
    /// them before they reach command dispatch.
    pub async fn dispatch_line(self: &Arc<Self>, role: Role, source: Source, line: &str) {
        match MessageRef::parse(line) {
            Ok(msg) => self.registry.dispatch(self, role, &source, &msg).await,
            Err(err) => trace!(%line, error = %err, "dropping unparseable line"),
        }
    }

    /// Whether a message source is a server or a service-flagged client.
    pub async fn source_is_service_or_server(&self, source: &Source) -> bool {
        match source {
            Source::Server(_) => true,
            Source::RemoteUser(uid) => match self.client_by_uid(uid) {
                Some(client) => client.read().await.is_service,
                None => false,
            },
            Source::Client(id) => match self.client(*id) {
                Some(client) => client.read().await.is_service,
                None => false,
            },
        }
    }
}
