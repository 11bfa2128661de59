//! KICK command handler.
//!
//! # Syntax
//!
//! `KICK <channel> <nick> [:<reason>]`
//!
//! # Behavior
//!
//! Channel operators only. Every member, the target included, sees the KICK
//! line before the target is removed. The reason defaults to the kicker's nick.

use async_trait::async_trait;
use tinyircd_proto::Message;
use tracing::info;

use super::super::{Context, Handler, require_arg};
use super::common::{find_channel, find_member, parse_reason, require_chanop};
use crate::error::HandlerResult;

pub struct KickHandler;

#[async_trait]
impl Handler for KickHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let channel_name = require_arg(msg, 0)?;
        let target_nick = require_arg(msg, 1)?;

        let channel = find_channel(ctx, channel_name)?;
        require_chanop(&channel, ctx.client)?;
        let target = find_member(ctx, &channel, target_nick)?;

        let kicker = ctx.nick();
        let reason = parse_reason(msg.arg(2)).unwrap_or(&kicker);
        let target_nick = target.nick();

        channel.broadcast(format!(
            ":{} KICK {} {target_nick} :{reason}",
            ctx.mask(),
            channel.name()
        ));
        ctx.matrix.leave_channel(&channel, &target);

        info!(
            channel = %channel.name(),
            kicker = %kicker,
            target = %target_nick,
            reason = %reason,
            "User kicked"
        );
        Ok(())
    }
}
