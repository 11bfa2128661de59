//! Channel operator shortcuts: OP, DEOP and BAN.
//!
//! Each is equivalent to one MODE change and is broadcast as such.

use async_trait::async_trait;
use tinyircd_proto::Message;
use tracing::info;

use super::super::{Context, Handler, expand_ban_mask, require_arg};
use super::common::{find_channel, find_member, require_chanop};
use crate::error::{ChannelError, HandlerError, HandlerResult};
use crate::state::is_valid_ban_mask;

/// Handler for OP command: `OP <channel> <nick>`.
pub struct OpHandler;

#[async_trait]
impl Handler for OpHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        set_op(ctx, msg, true)
    }
}

/// Handler for DEOP command: `DEOP <channel> <nick>`.
pub struct DeopHandler;

#[async_trait]
impl Handler for DeopHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        set_op(ctx, msg, false)
    }
}

fn set_op(ctx: &Context<'_>, msg: &Message, on: bool) -> HandlerResult {
    let channel_name = require_arg(msg, 0)?;
    let target_nick = require_arg(msg, 1)?;

    let channel = find_channel(ctx, channel_name)?;
    require_chanop(&channel, ctx.client)?;
    let target = find_member(ctx, &channel, target_nick)?;
    let target_nick = target.nick();

    {
        let mut state = channel.write();
        if !on && !state.is_op(target.id()) {
            return Err(ChannelError::NotChannelOperator {
                nick: target_nick,
                channel: channel.name().to_string(),
            }
            .into());
        }
        state.set_op(target.id(), on);
    }

    let sign = if on { '+' } else { '-' };
    channel.broadcast(format!(
        ":{} MODE {} {sign}o {target_nick}",
        ctx.mask(),
        channel.name()
    ));

    info!(
        channel = %channel.name(),
        by = %ctx.nick(),
        target = %target_nick,
        op = on,
        "Channel operator status changed"
    );
    Ok(())
}

/// Handler for BAN command: `BAN <channel> <mask|nick>`.
///
/// A bare nick is expanded to the holder's full mask.
pub struct BanHandler;

#[async_trait]
impl Handler for BanHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let channel_name = require_arg(msg, 0)?;
        let mask_arg = require_arg(msg, 1)?;

        let channel = find_channel(ctx, channel_name)?;
        require_chanop(&channel, ctx.client)?;

        let mask = expand_ban_mask(ctx.matrix, mask_arg);
        if !is_valid_ban_mask(&mask) {
            return Err(HandlerError::InvalidParam("Invalid ban mask"));
        }

        let nick = ctx.nick();
        channel.write().add_ban(&mask, &nick);
        channel.broadcast(format!(":{} MODE {} +b {mask}", ctx.mask(), channel.name()));

        info!(channel = %channel.name(), by = %nick, mask = %mask, "Ban added");
        Ok(())
    }
}
