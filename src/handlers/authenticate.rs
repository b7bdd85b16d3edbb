//! AUTHENTICATE command handler (unregistered clients only).
//!
//! Flow:
//!   1. Client sends  `AUTHENTICATE PLAIN`           (mechanism selection)
//!   2. Relay sends   `ENCAP * SASL uid * H host ip` (host info to services)
//!   3. Relay sends   `ENCAP * SASL uid * S PLAIN`   (start auth)
//!   4. Services send `ENCAP sid SASL agent uid C +` (request credentials)
//!   5. Relay sends   `AUTHENTICATE +`               (to client)
//!   6. Client sends  `AUTHENTICATE base64data`      (credentials)
//!   7. Relay sends   `ENCAP * SASL uid agent C b64` (relay to services)
//!   8. Services send `ENCAP sid SVSLOGIN uid ...`   (set account)
//!   9. Services send `ENCAP sid SASL agent uid D S` (success)
//!  10. Relay sends   900 + 903 to the client
//!
//! The payload is never inspected: mechanism names and base64 chunks are
//! relayed to services byte-exact.

use crate::error::HandlerResult;
use crate::handlers::{CommandHandler, Context, Source};
use crate::state::sasl::SASL_MAX_MESSAGES;
use crate::state::{Client, ClientId, Core};
use async_trait::async_trait;
use relay_proto::{MessageRef, Response};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Handler for AUTHENTICATE from local unregistered clients.
pub struct AuthenticateHandler;

/// What the session table decided for one AUTHENTICATE message; the
/// resulting sends happen after the table lock is released.
enum Step {
    /// New session: emit `H` then `S`.
    Opened,
    /// Table full: fail closed with 904.
    TableFull,
    /// In-progress session: relay a `C` message.
    Continue { agent: String },
    /// Message limit exceeded: 904, abort to the bound agent, done.
    Flooded { agent: Option<String> },
}

#[async_trait]
impl CommandHandler for AuthenticateHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        let Source::Client(client_id) = ctx.source else {
            return Ok(());
        };
        let Some(client) = ctx.core.client(*client_id) else {
            return Ok(());
        };

        // The parameter is relayed verbatim; min_args guarantees presence.
        let data = msg.arg(0).unwrap_or("");

        // Client must have negotiated the sasl capability.
        if !client.read().await.has_cap("sasl") {
            debug!(client = client_id, "AUTHENTICATE without sasl cap, dropping");
            return Ok(());
        }

        if data == "*" {
            abort_session(ctx.core, &client, *client_id).await;
            return Ok(());
        }

        // Assign a UID early so services can reference this client.
        // Host registration must not overwrite a UID assigned here.
        let uid = ensure_uid(ctx.core, &client, *client_id).await;

        let step = {
            let mut sessions = ctx.core.sessions();
            match sessions.find_mut(*client_id) {
                None => match sessions.allocate(*client_id) {
                    Some(_) => Step::Opened,
                    None => Step::TableFull,
                },
                Some(session) => {
                    session.messages += 1;
                    if session.messages > SASL_MAX_MESSAGES {
                        let agent = session.agent().map(str::to_string);
                        sessions.clear(*client_id);
                        Step::Flooded { agent }
                    } else {
                        Step::Continue {
                            agent: session.agent_or_placeholder().to_string(),
                        }
                    }
                }
            }
        };

        match step {
            Step::Opened => {
                let (host, sockhost) = {
                    let client = client.read().await;
                    (client.host.clone(), client.sockhost.clone())
                };
                info!(client = client_id, uid = %uid, mechanism = %data, "SASL session opened");
                // Host info, then mechanism start, as an adjacent pair.
                ctx.core
                    .send_to_servers(ctx.core.encap_sasl(&uid, "*", "H", &[&host, &sockhost]))
                    .await;
                ctx.core
                    .send_to_servers(ctx.core.encap_sasl(&uid, "*", "S", &[data]))
                    .await;
            }
            Step::TableFull => {
                debug!(client = client_id, "SASL session table full");
                let client = client.read().await;
                let reply = Response::err_saslfail(client.nick_or_star())
                    .with_prefix(ctx.core.server_prefix());
                ctx.core.send_to_client(&client, reply).await;
            }
            Step::Continue { agent } => {
                ctx.core
                    .send_to_servers(ctx.core.encap_sasl(&uid, &agent, "C", &[data]))
                    .await;
            }
            Step::Flooded { agent } => {
                debug!(client = client_id, "SASL message limit exceeded");
                {
                    let client = client.read().await;
                    let reply = Response::err_sasllimit(client.nick_or_star())
                        .with_prefix(ctx.core.server_prefix());
                    ctx.core.send_to_client(&client, reply).await;
                }
                if let Some(agent) = agent {
                    ctx.core
                        .send_to_servers(ctx.core.encap_sasl(&uid, &agent, "D", &["A"]))
                        .await;
                }
            }
        }

        Ok(())
    }
}

/// `AUTHENTICATE *`: tear the session down, telling the bound agent.
///
/// A spurious abort with no session still gets its 906.
async fn abort_session(core: &Arc<Core>, client: &Arc<RwLock<Client>>, client_id: ClientId) {
    let bound_agent = {
        let mut sessions = core.sessions();
        sessions
            .clear(client_id)
            .map(|session| session.agent().map(str::to_string))
    };

    let (nick, uid) = {
        let client = client.read().await;
        (client.nick_or_star().to_string(), client.uid.clone())
    };

    if let Some(Some(agent)) = bound_agent {
        if !uid.is_empty() {
            core.send_to_servers(core.encap_sasl(&uid, &agent, "D", &["A"]))
                .await;
        }
    }

    debug!(client = client_id, "SASL session aborted by client");
    let reply = Response::err_saslaborted(&nick).with_prefix(core.server_prefix());
    core.send_to_client(&*client.read().await, reply).await;
}

/// Ensure the client has a UID, registering a freshly allocated one in
/// the index when it does not.
async fn ensure_uid(core: &Arc<Core>, client: &Arc<RwLock<Client>>, client_id: ClientId) -> String {
    let mut client = client.write().await;
    if client.uid.is_empty() {
        let uid = core
            .uid_allocator
            .allocate(|candidate| core.uid_in_use(candidate));
        client.uid = uid.clone();
        core.register_uid(&uid, client_id);
        debug!(client = client_id, uid = %uid, "assigned UID for SASL");
    }
    client.uid.clone()
}
