//! SASL relay messages from services.
//!
//! After encapsulation dispatch the arguments are:
//!   arg 0 = agent UID (services side)
//!   arg 1 = target UID (our client)
//!   arg 2 = type: C (client data), D (done), L (login), M (mechanisms)
//!   arg 3 = data (base64, "S"/"F" for D, account name for L, list for M)

use super::update_mechanisms;
use crate::error::HandlerResult;
use crate::handlers::{CommandHandler, Context};
use crate::state::sasl::SASL_MAX_FAILURES;
use async_trait::async_trait;
use relay_proto::{Command, Message, MessageRef, Response};
use tracing::{debug, info};

/// Handler for encapsulated SASL messages from the services peer.
pub struct SaslHandler;

#[async_trait]
impl CommandHandler for SaslHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        let agent = msg.arg(0).unwrap_or("");
        let target_uid = msg.arg(1).unwrap_or("");
        let kind = msg.arg(2).unwrap_or("");

        let Some(target_id) = ctx.core.client_id_by_uid(target_uid) else {
            debug!(target = %target_uid, "SASL for unknown target, dropping");
            return Ok(());
        };
        let Some(target) = ctx.core.client(target_id) else {
            return Ok(());
        };
        if !target.read().await.is_local() {
            debug!(target = %target_uid, "SASL for non-local target, dropping");
            return Ok(());
        }

        match kind.bytes().next() {
            Some(b'C') => {
                // Client data: relay to the local client verbatim.
                let Some(data) = msg.arg(3) else {
                    return Ok(());
                };
                let reply = Message {
                    tags: None,
                    prefix: None,
                    command: Command::AUTHENTICATE(data.to_string()),
                };
                ctx.core.send_to_client(&*target.read().await, reply).await;

                // The sole point at which a session binds its agent.
                let mut sessions = ctx.core.sessions();
                if let Some(session) = sessions.find_mut(target_id) {
                    if session.agent().is_none() {
                        session.bind_agent(agent);
                        debug!(target = %target_uid, agent = %agent, "SASL agent bound");
                    }
                }
            }
            Some(b'D') => {
                // Done: data selects the outcome, 'S' for success.
                if msg.arg(3).is_some_and(|d| d.starts_with('S')) {
                    {
                        let target = target.read().await;
                        let nick = target.nick_or_star().to_string();
                        let mask = format!("{}!{}@{}", nick, target.username, target.host);
                        info!(target = %target_uid, account = %target.account, "SASL authentication succeeded");
                        let loggedin = Response::rpl_loggedin(&nick, &mask, &target.account)
                            .with_prefix(ctx.core.server_prefix());
                        ctx.core.send_to_client(&target, loggedin).await;
                        let succeeded = Response::rpl_saslsuccess(&nick)
                            .with_prefix(ctx.core.server_prefix());
                        ctx.core.send_to_client(&target, succeeded).await;
                    }
                    let mut sessions = ctx.core.sessions();
                    if let Some(session) = sessions.find_mut(target_id) {
                        session.complete = true;
                        sessions.clear(target_id);
                    }
                } else {
                    // Failure: the client may retry until the failure limit.
                    let terminal = {
                        let mut sessions = ctx.core.sessions();
                        match sessions.find_mut(target_id) {
                            Some(session) => {
                                session.failures += 1;
                                let terminal = session.failures >= SASL_MAX_FAILURES;
                                if terminal {
                                    sessions.clear(target_id);
                                }
                                terminal
                            }
                            None => false,
                        }
                    };
                    debug!(target = %target_uid, terminal, "SASL authentication failed");
                    let target = target.read().await;
                    let reply = Response::err_saslfail(target.nick_or_star())
                        .with_prefix(ctx.core.server_prefix());
                    ctx.core.send_to_client(&target, reply).await;
                }
            }
            Some(b'L') => {
                // Login: set the account name on the target client.
                let Some(account) = msg.arg(3) else {
                    return Ok(());
                };
                target.write().await.set_account(account);
            }
            Some(b'M') => {
                let mechs = msg.arg(3).filter(|m| !m.is_empty());
                update_mechanisms(ctx.core, mechs);
            }
            _ => debug!(kind = %kind, "unknown SASL message type, dropping"),
        }

        Ok(())
    }
}
