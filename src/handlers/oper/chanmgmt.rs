//! Operator-assisted channel management: OPERBAN, OPERGIVE, OPERREMOVE.
//!
//! These act on any channel without the operator being a member or holding
//! channel-operator status there.

use async_trait::async_trait;
use tinyircd_proto::{Message, matches_user_mask};
use tracing::info;

use super::super::channel::common::{find_channel, find_member};
use super::super::core::require_arg;
use super::super::{Context, Handler, expand_ban_mask, server_notice};
use crate::error::{ChannelError, HandlerError, HandlerResult};
use crate::state::is_valid_ban_mask;

const DEFAULT_BAN_REASON: &str = "Banned by IRC operator";

/// Handler for OPERBAN command.
///
/// `OPERBAN <channel> <mask> [:<reason>]`
///
/// Bans the mask and kicks every matching member except the issuer and other
/// IRC operators.
pub struct OperBanHandler;

#[async_trait]
impl Handler for OperBanHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        ctx.require_oper()?;

        let channel_name = require_arg(msg, 0)?;
        let mask_arg = require_arg(msg, 1)?;
        let reason = msg.nonempty_arg(2).unwrap_or(DEFAULT_BAN_REASON);

        let channel = find_channel(ctx, channel_name)?;
        let mask = expand_ban_mask(ctx.matrix, mask_arg);
        if !is_valid_ban_mask(&mask) {
            return Err(HandlerError::InvalidParam("Invalid ban mask"));
        }

        let oper = ctx.nick();
        let source = ctx.mask();
        channel.write().add_ban(&mask, &oper);
        channel.broadcast(format!(":{source} MODE {} +b {mask}", channel.name()));
        info!(oper = %oper, channel = %channel.name(), mask = %mask, reason = %reason, "OPERBAN");

        for (member, _) in channel.members() {
            if member.id() == ctx.client.id() || member.is_oper() {
                continue;
            }
            if !matches_user_mask(&member.mask(), &mask) {
                continue;
            }
            let nick = member.nick();
            channel.broadcast(format!(":{source} KICK {} {nick} :{reason}", channel.name()));
            ctx.matrix.leave_channel(&channel, &member);
            info!(oper = %oper, channel = %channel.name(), target = %nick, "OPERBAN kick");
        }
        Ok(())
    }
}

/// Handler for OPERGIVE command.
///
/// `OPERGIVE <channel> <nick>`
pub struct OperGiveHandler;

#[async_trait]
impl Handler for OperGiveHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        set_chanop(ctx, msg, true)
    }
}

/// Handler for OPERREMOVE command.
///
/// `OPERREMOVE <channel> <nick>`
pub struct OperRemoveHandler;

#[async_trait]
impl Handler for OperRemoveHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        set_chanop(ctx, msg, false)
    }
}

fn set_chanop(ctx: &Context<'_>, msg: &Message, grant: bool) -> HandlerResult {
    ctx.require_oper()?;

    let channel_name = require_arg(msg, 0)?;
    let target_nick = require_arg(msg, 1)?;
    let channel = find_channel(ctx, channel_name)?;
    let target = find_member(ctx, &channel, target_nick)?;
    let nick = target.nick();

    {
        let mut state = channel.write();
        if !grant && !state.is_op(target.id()) {
            return Err(ChannelError::NotChannelOperator {
                nick,
                channel: channel.name().to_string(),
            }
            .into());
        }
        state.set_op(target.id(), grant);
    }

    let oper = ctx.nick();
    let sign = if grant { '+' } else { '-' };
    channel.broadcast(format!(
        ":{} MODE {} {sign}o {nick}",
        ctx.mask(),
        channel.name()
    ));

    let text = if grant {
        format!(
            "You have been given channel operator status in {} by IRC operator {oper}",
            channel.name()
        )
    } else {
        format!(
            "Your channel operator status in {} has been removed by IRC operator {oper}",
            channel.name()
        )
    };
    target.send(server_notice(ctx.server_name(), &nick, &text));

    info!(oper = %oper, channel = %channel.name(), target = %nick, grant, "Operator changed channel op");
    Ok(())
}
