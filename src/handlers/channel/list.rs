//! LIST command handler.

use async_trait::async_trait;
use tinyircd_proto::{Message, Response};

use super::super::{Context, Handler};
use super::common::parse_channel_list;
use crate::error::HandlerResult;

/// Handler for LIST command.
///
/// `LIST [<channel>{,<channel>}]`. Secret and private channels are only shown
/// to their members.
pub struct ListHandler;

#[async_trait]
impl Handler for ListHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        ctx.reply(Response::RPL_LISTSTART, "Channel :Users  Name");

        let channels: Vec<_> = match msg.nonempty_arg(0) {
            Some(filter) => parse_channel_list(filter)
                .into_iter()
                .filter_map(|name| ctx.matrix.lookup_channel(name))
                .collect(),
            None => ctx.matrix.list_channels(),
        };

        for channel in channels {
            let entry = {
                let state = channel.read();
                let hidden = (state.modes.secret || state.modes.private)
                    && !state.is_member(ctx.client.id());
                (!hidden).then(|| {
                    let topic = state.topic.as_ref().map(|t| t.text.as_str()).unwrap_or("");
                    format!("{} {} :{topic}", channel.name(), state.member_count())
                })
            };
            if let Some(entry) = entry {
                ctx.reply(Response::RPL_LIST, &entry);
            }
        }

        ctx.reply(Response::RPL_LISTEND, ":End of /LIST");
        Ok(())
    }
}
