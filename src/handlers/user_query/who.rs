//! WHO handler.
//!
//! `WHO [<channel> | <mask>]`
//!
//! A channel lists its members; anything else is a glob matched against each
//! registered user's nick, user, host and realname. Without an argument every
//! visible user is listed.

use std::sync::Arc;

use async_trait::async_trait;
use tinyircd_proto::{Mask, Message, Response};

use super::super::{Context, Handler};
use crate::error::HandlerResult;
use crate::state::{Channel, Client, MemberModes};

/// Handler for WHO command.
pub struct WhoHandler;

#[async_trait]
impl Handler for WhoHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let mask = msg.nonempty_arg(0).unwrap_or("*");

        if mask.starts_with(['#', '&']) {
            if let Some(channel) = ctx.matrix.lookup_channel(mask) {
                who_channel(ctx, &channel);
            }
        } else {
            who_mask(ctx, mask);
        }

        ctx.reply(Response::RPL_ENDOFWHO, &format!("{mask} :End of WHO list"));
        Ok(())
    }
}

fn who_channel(ctx: &Context<'_>, channel: &Channel) {
    let visible = {
        let state = channel.read();
        !state.modes.secret || state.is_member(ctx.client.id())
    };
    if !visible {
        return;
    }
    for (member, modes) in channel.members() {
        send_who_reply(ctx, channel.name(), &member, Some(modes));
    }
}

fn who_mask(ctx: &Context<'_>, mask: &str) {
    // `0` is the traditional spelling of "everyone".
    let pattern = if mask == "0" { "*" } else { mask };
    let Ok(glob) = Mask::compile(pattern) else {
        return;
    };

    let peers: Vec<_> = ctx.client.peers().iter().map(|p| p.id()).collect();
    let mut clients = ctx.matrix.clients();
    clients.sort_by_key(|c| c.id());

    for client in clients {
        let matched = {
            let state = client.state();
            // Invisible users are only listed to themselves and co-members.
            let hidden = state.modes.invisible
                && client.id() != ctx.client.id()
                && !peers.contains(&client.id());
            !hidden
                && [
                    state.nick.as_str(),
                    state.user.as_str(),
                    state.display_host(),
                    state.realname.as_str(),
                ]
                .iter()
                .any(|field| glob.is_match(field))
        };
        if matched {
            send_who_reply(ctx, "*", &client, None);
        }
    }
}

/// 352 `<chan> <user> <host> <server> <nick> <H|G>[*][@|+] :0 <realname>`
fn send_who_reply(ctx: &Context<'_>, chan: &str, client: &Arc<Client>, modes: Option<MemberModes>) {
    let text = {
        let state = client.state();
        let mut flags = String::from(if state.away.is_some() { "G" } else { "H" });
        if state.modes.oper {
            flags.push('*');
        }
        if let Some(prefix) = modes.and_then(|m| m.prefix_char()) {
            flags.push(prefix);
        }
        format!(
            "{chan} {} {} {} {} {flags} :0 {}",
            state.user,
            state.display_host(),
            ctx.server_name(),
            state.nick,
            state.realname
        )
    };
    ctx.reply(Response::RPL_WHOREPLY, &text);
}
