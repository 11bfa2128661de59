//! NICK command handler.
//!
//! # Syntax
//!
//! `NICK <nickname>`
//!
//! # Behavior
//!
//! - Before registration, claims the nick and may complete registration.
//! - After registration, renames the client and tells it and every co-member
//!   (once each) with `:<old mask> NICK <new>`.

use async_trait::async_trait;
use tinyircd_proto::{Message, is_valid_nickname};
use tracing::debug;

use super::super::{Context, Handler};
use super::welcome::try_complete_registration;
use crate::error::{HandlerError, HandlerResult};

/// Handler for NICK command.
pub struct NickHandler;

#[async_trait]
impl Handler for NickHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let nick = msg.nonempty_arg(0).ok_or(HandlerError::NoNicknameGiven)?;

        if !is_valid_nickname(nick) || nick.len() > ctx.matrix.config.limits.max_nick_length {
            return Err(HandlerError::ErroneousNickname(nick.to_string()));
        }

        if ctx.client.state().nick == nick {
            return Ok(());
        }

        let old_mask = ctx.client.mask();
        let old_nick = ctx.matrix.register_nick(ctx.client, nick)?;
        debug!(old = ?old_nick, new = %nick, "Nick changed");

        if ctx.client.is_registered() {
            let line: std::sync::Arc<str> = format!(":{old_mask} NICK {nick}").into();
            ctx.send(line.clone());
            for peer in ctx.client.peers() {
                peer.send(line.clone());
            }
        } else {
            try_complete_registration(ctx);
        }

        Ok(())
    }

    fn requires_registration(&self) -> bool {
        false
    }
}
