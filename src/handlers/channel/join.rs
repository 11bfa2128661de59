//! JOIN command handler.
//!
//! # Syntax
//!
//! `JOIN <channel>{,<channel>} [<key>{,<key>}]` or `JOIN 0`
//!
//! # Behavior
//!
//! - `JOIN 0` parts every joined channel.
//! - Each name is handled on its own; a failure is reported and the rest
//!   continue.
//! - Creating a channel makes the joiner its operator and applies the
//!   configured default modes.
//! - A successful join is followed by the topic and NAMES replies.

use async_trait::async_trait;
use tinyircd_proto::{Message, irc_to_lower, is_valid_channel_name};
use tracing::debug;

use super::super::{Context, Handler};
use super::common::{is_join_zero, parse_channel_list, parse_key_list, send_names, send_topic};
use crate::error::{ChannelError, HandlerError, HandlerResult};

/// Handler for JOIN command.
pub struct JoinHandler;

#[async_trait]
impl Handler for JoinHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let channels_str = msg.nonempty_arg(0).ok_or(HandlerError::NeedMoreParams)?;

        if is_join_zero(channels_str) {
            leave_all_channels(ctx);
            return Ok(());
        }

        let names = parse_channel_list(channels_str);
        let keys = parse_key_list(msg.arg(1), names.len());

        for (name, key) in names.into_iter().zip(keys) {
            if let Err(e) = join_one(ctx, name, key) {
                ctx.send_error(&e, "JOIN");
            }
        }
        Ok(())
    }
}

fn join_one(ctx: &Context<'_>, name: &str, key: Option<&str>) -> HandlerResult {
    let limits = &ctx.matrix.config.limits;

    if !is_valid_channel_name(name) {
        return Err(HandlerError::NoSuchChannel(name.to_string()));
    }
    if name.len() > limits.max_channel_name {
        return Err(ChannelError::BadChanMask(name.to_string()).into());
    }
    if ctx.client.in_channel(&irc_to_lower(name)) {
        return Ok(());
    }
    if ctx.client.channel_count() >= limits.max_channels {
        return Err(ChannelError::TooManyChannels(name.to_string()).into());
    }

    let outcome = ctx.matrix.join_channel(ctx.client, name, key)?;
    let channel = outcome.channel;

    if outcome.created {
        let modes = channel.read().modes.as_mode_string_with_params();
        if modes != "+" {
            ctx.send(format!(
                ":{} MODE {} {}",
                ctx.server_name(),
                channel.name(),
                modes
            ));
        }
    }

    channel.broadcast(format!(":{} JOIN {}", ctx.mask(), channel.name()));
    send_topic(ctx, &channel);
    send_names(ctx, &channel);

    debug!(channel = %channel.name(), created = outcome.created, "Joined channel");
    Ok(())
}

/// `JOIN 0`: part everything, using the nick as the reason.
fn leave_all_channels(ctx: &Context<'_>) {
    let mask = ctx.mask();
    let nick = ctx.nick();
    for channel in ctx.client.channels() {
        channel.broadcast(format!(":{mask} PART {} :{nick}", channel.name()));
        ctx.matrix.leave_channel(&channel, ctx.client);
    }
}
