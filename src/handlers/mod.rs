//! Command handlers and role-keyed dispatch.
//!
//! The host daemon classifies every message source into a [`Role`] before
//! dispatch: local unregistered connection, local registered client,
//! server link, encapsulated traffic, or operator. A command registers
//! one handler slot per role; [`Slot::Ignore`] is the identity element
//! for roles a command never applies to, and [`Slot::Registered`] answers
//! pre-registration-only commands sent after registration with numeric
//! 462.

pub mod authenticate;
pub mod s2s;

pub use authenticate::AuthenticateHandler;
pub use s2s::{MechlistHandler, SaslHandler, SvsloginHandler};

use crate::error::{HandlerError, HandlerResult};
use crate::state::{ClientId, Core};
use async_trait::async_trait;
use relay_proto::{MessageRef, Response};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, trace};

/// Message-source roles, in command-table order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Role {
    /// Local connection that has not completed registration.
    Unregistered,
    /// Local registered client.
    Client,
    /// Directly from a linked server.
    Server,
    /// Carried by the server-to-server encapsulation envelope.
    Encap,
    /// Local operator.
    Oper,
}

impl Role {
    /// Number of roles; the width of a command's handler table.
    pub const COUNT: usize = 5;

    fn index(self) -> usize {
        match self {
            Role::Unregistered => 0,
            Role::Client => 1,
            Role::Server => 2,
            Role::Encap => 3,
            Role::Oper => 4,
        }
    }
}

/// The origin of a dispatched message.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Source {
    /// A local client connection.
    Client(ClientId),
    /// A linked server, by SID or name.
    Server(String),
    /// A user elsewhere on the network, by UID.
    RemoteUser(String),
}

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// Shared daemon state.
    pub core: &'a Arc<Core>,
    /// Where the message came from.
    pub source: &'a Source,
}

/// Trait implemented by all command handlers.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Handle an incoming message.
    async fn handle(&self, ctx: &Context<'_>, msg: &MessageRef<'_>) -> HandlerResult;
}

/// What a command does for one role.
pub enum Slot {
    /// Silently drop the message.
    Ignore,
    /// Reply 462: the command is only valid before registration.
    Registered,
    /// Invoke a handler, after checking the argument count.
    Handler {
        handler: Arc<dyn CommandHandler>,
        min_args: usize,
    },
}

/// A command and its per-role handler table.
pub struct CommandEntry {
    /// Command name, uppercase.
    pub name: &'static str,
    slots: [Slot; Role::COUNT],
}

impl CommandEntry {
    /// Start an entry with every role set to [`Slot::Ignore`].
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: [
                Slot::Ignore,
                Slot::Ignore,
                Slot::Ignore,
                Slot::Ignore,
                Slot::Ignore,
            ],
        }
    }

    /// Bind a handler for a role.
    pub fn on(mut self, role: Role, handler: Arc<dyn CommandHandler>, min_args: usize) -> Self {
        self.slots[role.index()] = Slot::Handler { handler, min_args };
        self
    }

    /// Mark a role as already-registered (numeric 462).
    pub fn registered(mut self, role: Role) -> Self {
        self.slots[role.index()] = Slot::Registered;
        self
    }

    fn slot(&self, role: Role) -> &Slot {
        &self.slots[role.index()]
    }
}

/// Registry of command specs, keyed by uppercase command name.
///
/// Commands are added and removed at runtime so module teardown can
/// unregister what it installed.
pub struct Registry {
    commands: RwLock<HashMap<&'static str, Arc<CommandEntry>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            commands: RwLock::new(HashMap::new()),
        }
    }

    /// Install a command.
    pub fn add(&self, entry: CommandEntry) {
        let mut commands = self
            .commands
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        commands.insert(entry.name, Arc::new(entry));
    }

    /// Remove a command. Returns whether it was installed.
    pub fn remove(&self, name: &str) -> bool {
        let mut commands = self
            .commands
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        commands.remove(name).is_some()
    }

    fn lookup(&self, name: &str) -> Option<Arc<CommandEntry>> {
        let commands = self.commands.read().unwrap_or_else(PoisonError::into_inner);
        commands.get(name).cloned()
    }

    /// Dispatch a message to the slot registered for its role.
    ///
    /// Errors never propagate to the caller: local clients get a numeric
    /// where one applies, everything else is dropped with a trace.
    pub async fn dispatch(
        &self,
        core: &Arc<Core>,
        role: Role,
        source: &Source,
        msg: &MessageRef<'_>,
    ) {
        let name = msg.command_name();
        let Some(entry) = self.lookup(&name) else {
            trace!(command = %name, "no handler registered, dropping");
            return;
        };

        match entry.slot(role) {
            Slot::Ignore => {}
            Slot::Registered => {
                reply_already_registered(core, source).await;
            }
            Slot::Handler { handler, min_args } => {
                let result = if msg.arg_count() < *min_args {
                    Err(HandlerError::NeedMoreParams)
                } else {
                    handler.handle(&Context { core, source }, msg).await
                };
                if let Err(err) = result {
                    handle_dispatch_error(core, source, entry.name, err).await;
                }
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

async fn reply_already_registered(core: &Arc<Core>, source: &Source) {
    let Source::Client(id) = source else {
        return;
    };
    let Some(client) = core.client(*id) else {
        return;
    };
    let client = client.read().await;
    let reply =
        Response::err_alreadyregistered(client.nick_or_star()).with_prefix(core.server_prefix());
    core.send_to_client(&client, reply).await;
}

async fn handle_dispatch_error(core: &Arc<Core>, source: &Source, name: &str, err: HandlerError) {
    match source {
        Source::Client(id) => {
            let Some(client) = core.client(*id) else {
                return;
            };
            let client = client.read().await;
            let reply = match err {
                HandlerError::NeedMoreParams => {
                    Response::err_needmoreparams(client.nick_or_star(), name)
                }
            };
            core.send_to_client(&client, reply.with_prefix(core.server_prefix()))
                .await;
        }
        // Malformed server-originated traffic is dropped silently.
        _ => debug!(command = %name, error = %err, "dropping malformed server message"),
    }
}
