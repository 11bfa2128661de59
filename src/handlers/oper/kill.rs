//! KILL handler.

use async_trait::async_trait;
use tinyircd_proto::Message;
use tracing::info;

use super::super::channel::common::find_client;
use super::super::core::require_arg;
use super::super::{Context, Handler};
use crate::error::HandlerResult;

const DEFAULT_REASON: &str = "No reason given";

/// Handler for KILL command.
///
/// `KILL <nickname> [:<reason>]`
///
/// Disconnects a client. Co-members see the target QUIT with
/// `Killed by <oper> (<reason>)` once its connection task cleans up.
pub struct KillHandler;

#[async_trait]
impl Handler for KillHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        ctx.require_oper()?;

        let target_nick = require_arg(msg, 0)?;
        let reason = msg.nonempty_arg(1).unwrap_or(DEFAULT_REASON);
        let target = find_client(ctx, target_nick)?;

        let oper = ctx.nick();
        let (nick, host) = {
            let state = target.state();
            (state.nick.clone(), state.host.clone())
        };
        let quit_reason = format!("Killed by {oper} ({reason})");

        target.send(format!(":{} KILL {nick} :{reason}", ctx.mask()));
        target.send(format!("ERROR :Closing Link: {host} ({quit_reason})"));
        target.close_with(quit_reason);

        info!(oper = %oper, target = %nick, reason = %reason, "KILL");
        Ok(())
    }
}
