//! Message routing shared by PRIVMSG and NOTICE.

use std::sync::Arc;

use tinyircd_proto::{Message, Response};

use super::super::Context;
use crate::error::{ChannelError, HandlerError};

/// Per-command routing behavior.
#[derive(Debug, Clone, Copy)]
pub struct RouteOptions {
    /// Command verb used in the relayed line and in error replies.
    pub command: &'static str,
    /// Reply with 301 when the target user is away.
    pub send_away_reply: bool,
}

/// A parsed `<targets> :<text>` pair.
pub struct Outgoing<'m> {
    pub targets: Vec<&'m str>,
    pub text: &'m str,
}

/// Split the targets and text out of PRIVMSG/NOTICE: 411, then 412.
pub fn parse_outgoing(msg: &Message) -> Result<Outgoing<'_>, HandlerError> {
    let targets = msg.nonempty_arg(0).ok_or(HandlerError::NoRecipient)?;
    let text = msg.nonempty_arg(1).ok_or(HandlerError::NoTextToSend)?;
    Ok(Outgoing {
        targets: targets.split(',').filter(|t| !t.is_empty()).collect(),
        text,
    })
}

/// Deliver `text` to one channel or nick.
pub fn route(
    ctx: &Context<'_>,
    target: &str,
    text: &str,
    opts: RouteOptions,
) -> Result<(), HandlerError> {
    if target.starts_with(['#', '&']) {
        route_to_channel(ctx, target, text, opts)
    } else {
        route_to_user(ctx, target, text, opts)
    }
}

fn route_to_channel(
    ctx: &Context<'_>,
    target: &str,
    text: &str,
    opts: RouteOptions,
) -> Result<(), HandlerError> {
    let channel = ctx
        .matrix
        .lookup_channel(target)
        .ok_or_else(|| HandlerError::NoSuchChannel(target.to_string()))?;

    {
        let state = channel.read();
        let id = ctx.client.id();
        if state.modes.no_external && !state.is_member(id) {
            return Err(ChannelError::CannotSendToChan(channel.name().to_string()).into());
        }
        if state.modes.moderated && !state.can_speak(id) {
            return Err(ChannelError::CannotSendModerated(channel.name().to_string()).into());
        }
    }

    let line: Arc<str> = format!(
        ":{} {} {} :{text}",
        ctx.mask(),
        opts.command,
        channel.name()
    )
    .into();
    channel.broadcast_except(ctx.client.id(), line);
    Ok(())
}

fn route_to_user(
    ctx: &Context<'_>,
    target: &str,
    text: &str,
    opts: RouteOptions,
) -> Result<(), HandlerError> {
    let recipient = ctx
        .matrix
        .lookup_client(target)
        .ok_or_else(|| HandlerError::NoSuchNick(target.to_string()))?;

    let (nick, away) = {
        let state = recipient.state();
        (state.nick.clone(), state.away.clone())
    };

    recipient.send(format!(":{} {} {nick} :{text}", ctx.mask(), opts.command));

    if opts.send_away_reply
        && let Some(away) = away
    {
        ctx.reply(Response::RPL_AWAY, &format!("{nick} :{away}"));
    }
    Ok(())
}
