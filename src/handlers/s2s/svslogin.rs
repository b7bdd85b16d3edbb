//! SVSLOGIN: identity overlay pushed by services.
//!
//! After encapsulation dispatch the arguments are:
//!   arg 0 = target UID
//!   arg 1 = nick    (or "*" = unchanged)
//!   arg 2 = ident   (or "*" = unchanged)
//!   arg 3 = vhost   (or "*" = unchanged)
//!   arg 4 = account (or "*" = unchanged)
//!
//! Absent arguments also mean unchanged. Nick changes travel a separate
//! SVSNICK path in the host daemon; the nick argument is accepted for
//! protocol completeness and not acted on here.

use crate::error::HandlerResult;
use crate::handlers::{CommandHandler, Context};
use async_trait::async_trait;
use relay_proto::MessageRef;
use tracing::debug;

/// Sentinel meaning "leave this field unchanged".
const UNCHANGED: &str = "*";

/// Handler for encapsulated SVSLOGIN messages.
pub struct SvsloginHandler;

#[async_trait]
impl CommandHandler for SvsloginHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        if !ctx.core.source_is_service_or_server(ctx.source).await {
            debug!(source = ?ctx.source, "SVSLOGIN from untrusted origin, dropping");
            return Ok(());
        }

        let target_uid = msg.arg(0).unwrap_or("");
        let Some(target) = ctx.core.client_by_uid(target_uid) else {
            debug!(target = %target_uid, "SVSLOGIN for unknown target, dropping");
            return Ok(());
        };

        if let Some(nick) = msg.arg(1).filter(|v| *v != UNCHANGED) {
            debug!(target = %target_uid, nick = %nick, "SVSLOGIN nick field ignored");
        }

        let mut target = target.write().await;
        if let Some(ident) = msg.arg(2).filter(|v| *v != UNCHANGED) {
            target.set_username(ident);
        }
        if let Some(vhost) = msg.arg(3).filter(|v| *v != UNCHANGED) {
            target.set_host(vhost);
        }
        if let Some(account) = msg.arg(4).filter(|v| *v != UNCHANGED) {
            target.set_account(account);
        }

        Ok(())
    }
}
