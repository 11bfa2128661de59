//! PART command handler.
//!
//! # RFC 2812 §3.2.2 - Part message
//!
//! ## Syntax
//! ```text
//! PART <channels> [<reason>]
//! ```
//!
//! ## Behavior
//! - Can part multiple channels (comma-separated)
//! - The PART line reaches every member, the parting user included
//! - Defaults the reason to the parting nick
//! - Reclaims the channel once empty

use async_trait::async_trait;
use tinyircd_proto::Message;
use tracing::debug;

use super::super::{Context, Handler};
use super::common::{find_channel, parse_channel_list, parse_reason, require_member};
use crate::error::{HandlerError, HandlerResult};

pub struct PartHandler;

#[async_trait]
impl Handler for PartHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let channels_str = msg.nonempty_arg(0).ok_or(HandlerError::NeedMoreParams)?;
        let nick = ctx.nick();
        let reason = parse_reason(msg.arg(1)).unwrap_or(&nick).to_string();

        for name in parse_channel_list(channels_str) {
            if let Err(e) = part_one(ctx, name, &reason) {
                ctx.send_error(&e, "PART");
            }
        }
        Ok(())
    }
}

fn part_one(ctx: &Context<'_>, name: &str, reason: &str) -> HandlerResult {
    let channel = find_channel(ctx, name)?;
    require_member(&channel, ctx.client)?;

    channel.broadcast(format!(":{} PART {} :{reason}", ctx.mask(), channel.name()));
    ctx.matrix.leave_channel(&channel, ctx.client);

    debug!(channel = %channel.name(), "Parted channel");
    Ok(())
}
