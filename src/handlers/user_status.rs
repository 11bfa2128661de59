//! User status handlers: AWAY
//!
//! The away text shows up in WHOIS, WHO (`G` flag), USERHOST and as a 301
//! reply to anyone who PRIVMSGs the user.

use async_trait::async_trait;
use tinyircd_proto::{Message, Response};
use tracing::debug;

use super::{Context, Handler};
use crate::error::HandlerResult;

/// Handler for AWAY command.
///
/// `AWAY [message]`
///
/// Sets or clears away status.
pub struct AwayHandler;

#[async_trait]
impl Handler for AwayHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let away = msg.nonempty_arg(0).map(str::to_string);
        let now_away = away.is_some();
        ctx.client.state_mut().away = away;

        if now_away {
            debug!(nick = %ctx.nick(), "Marked away");
            ctx.reply(
                Response::RPL_NOWAWAY,
                ":You have been marked as being away",
            );
        } else {
            debug!(nick = %ctx.nick(), "No longer away");
            ctx.reply(
                Response::RPL_UNAWAY,
                ":You are no longer marked as being away",
            );
        }
        Ok(())
    }
}
