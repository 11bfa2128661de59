//! INVITE command handler.
//!
//! # Syntax
//!
//! `INVITE <nick> <channel>`
//!
//! # Behavior
//!
//! Adds the nick to the channel's invite list so it can pass `+i`. On a `+i`
//! channel only operators may invite. The invite is used up by the next JOIN.

use async_trait::async_trait;
use tinyircd_proto::{Message, Response};
use tracing::debug;

use super::super::{Context, Handler, require_arg};
use super::common::{find_channel, find_client};
use crate::error::{ChannelError, HandlerResult};

pub struct InviteHandler;

#[async_trait]
impl Handler for InviteHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let target_nick = require_arg(msg, 0)?;
        let channel_name = require_arg(msg, 1)?;

        let target = find_client(ctx, target_nick)?;
        let channel = find_channel(ctx, channel_name)?;
        let target_nick = target.nick();

        {
            let mut state = channel.write();
            if !state.is_member(ctx.client.id()) {
                return Err(ChannelError::NotOnChannel(channel.name().to_string()).into());
            }
            if state.modes.invite_only && !state.is_op(ctx.client.id()) {
                return Err(ChannelError::ChanOpPrivsNeeded(channel.name().to_string()).into());
            }
            if state.is_member(target.id()) {
                return Err(ChannelError::UserOnChannel {
                    nick: target_nick,
                    channel: channel.name().to_string(),
                }
                .into());
            }
            state.invite(&target_nick);
        }

        ctx.reply(
            Response::RPL_INVITING,
            &format!("{target_nick} {}", channel.name()),
        );
        target.send(format!(
            ":{} INVITE {target_nick} {}",
            ctx.mask(),
            channel.name()
        ));

        debug!(channel = %channel.name(), target = %target_nick, "Invite sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{Harness, drain};

    #[tokio::test]
    async fn test_invite_lets_user_past_invite_only() {
        let h = Harness::new();
        let (alice, mut ra) = h.registered(1, "alice");
        let (bob, mut rb) = h.registered(2, "bob");
        h.run(&alice, "JOIN #inv").await.unwrap();
        h.run(&alice, "MODE #inv +i").await.unwrap();
        drain(&mut ra);

        h.run(&bob, "JOIN #inv").await.unwrap();
        assert_eq!(
            drain(&mut rb),
            vec![":irc.test 473 bob #inv :Cannot join channel (+i)"]
        );

        h.run(&alice, "INVITE BOB #inv").await.unwrap();
        assert_eq!(drain(&mut ra), vec![":irc.test 341 alice bob #inv"]);
        assert_eq!(drain(&mut rb), vec![":alice!alice@127.0.0.1 INVITE bob #inv"]);

        h.run(&bob, "JOIN #inv").await.unwrap();
        assert!(bob.in_channel("#inv"));

        h.run(&alice, "INVITE bob #inv").await.unwrap_err();
        assert_eq!(
            drain(&mut ra).last().unwrap(),
            ":irc.test 443 alice bob #inv :is already on channel"
        );
    }

    #[tokio::test]
    async fn test_invite_errors() {
        let h = Harness::new();
        let (alice, mut ra) = h.registered(1, "alice");
        let (bob, mut rb) = h.registered(2, "bob");
        let (carol, mut rc) = h.registered(3, "carol");
        h.run(&alice, "JOIN #inv").await.unwrap();
        h.run(&bob, "JOIN #inv").await.unwrap();
        h.run(&alice, "MODE #inv +i").await.unwrap();
        drain(&mut ra);

        h.run(&carol, "INVITE bob").await.unwrap_err();
        h.run(&carol, "INVITE ghost #inv").await.unwrap_err();
        h.run(&carol, "INVITE bob #none").await.unwrap_err();
        h.run(&carol, "INVITE alice #inv").await.unwrap_err();
        assert_eq!(
            drain(&mut rc),
            vec![
                ":irc.test 461 carol INVITE :Not enough parameters",
                ":irc.test 401 carol ghost :No such nick/channel",
                ":irc.test 403 carol #none :No such channel",
                ":irc.test 442 carol #inv :You're not on that channel",
            ]
        );

        // Non-op member on a +i channel.
        drain(&mut rb);
        h.run(&bob, "INVITE carol #inv").await.unwrap_err();
        assert_eq!(
            drain(&mut rb),
            vec![":irc.test 482 bob #inv :You're not channel operator"]
        );
    }
}
