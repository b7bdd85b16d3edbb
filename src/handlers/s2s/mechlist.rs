//! MECHLIST: mechanism list update from services.
//!
//! Single optional argument: a space-separated mechanism list. Effect is
//! identical to a SASL message of type `M`.

use super::update_mechanisms;
use crate::error::HandlerResult;
use crate::handlers::{CommandHandler, Context};
use async_trait::async_trait;
use relay_proto::MessageRef;

/// Handler for encapsulated MECHLIST messages.
pub struct MechlistHandler;

#[async_trait]
impl CommandHandler for MechlistHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &MessageRef<'_>) -> HandlerResult {
        let mechs = msg.arg(0).filter(|m| !m.is_empty());
        update_mechanisms(ctx.core, mechs);
        Ok(())
    }
}
