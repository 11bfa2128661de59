//! NAMES command handler.

use async_trait::async_trait;
use tinyircd_proto::{Message, Response};

use super::super::{Context, Handler};
use super::common::{parse_channel_list, send_names};
use crate::error::HandlerResult;

/// Handler for NAMES command.
///
/// `NAMES [<channel>{,<channel>}]`. Unknown channels and, for non-members,
/// secret ones produce only the end-of-list line.
pub struct NamesHandler;

#[async_trait]
impl Handler for NamesHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Some(channels_str) = msg.nonempty_arg(0) else {
            ctx.reply(Response::RPL_ENDOFNAMES, "* :End of NAMES list");
            return Ok(());
        };

        for name in parse_channel_list(channels_str) {
            match ctx.matrix.lookup_channel(name) {
                Some(channel) => send_names(ctx, &channel),
                None => ctx.reply(
                    Response::RPL_ENDOFNAMES,
                    &format!("{name} :End of NAMES list"),
                ),
            }
        }
        Ok(())
    }
}
