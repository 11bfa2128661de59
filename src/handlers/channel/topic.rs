//! TOPIC command handler.
//!
//! # Syntax
//!
//! `TOPIC <channel> [:<text>]`
//!
//! Without text the current topic is returned; an empty text clears it.
//! Setting it on a `+t` channel needs channel operator status.

use async_trait::async_trait;
use tinyircd_proto::{Message, truncate_utf8_safe};

use super::super::{Context, Handler};
use super::common::{find_channel, send_topic};
use crate::error::{ChannelError, HandlerError, HandlerResult};

/// Longest stored topic in bytes.
const MAX_TOPIC_BYTES: usize = 307;

pub struct TopicHandler;

#[async_trait]
impl Handler for TopicHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let name = msg.nonempty_arg(0).ok_or(HandlerError::NeedMoreParams)?;
        let channel = find_channel(ctx, name)?;

        let Some(text) = msg.arg(1) else {
            if !channel.read().is_member(ctx.client.id()) {
                return Err(ChannelError::NotOnChannel(channel.name().to_string()).into());
            }
            send_topic(ctx, &channel);
            return Ok(());
        };

        let text = truncate_utf8_safe(text, MAX_TOPIC_BYTES).to_string();
        let nick = ctx.nick();
        {
            let mut state = channel.write();
            if !state.is_member(ctx.client.id()) {
                return Err(ChannelError::NotOnChannel(channel.name().to_string()).into());
            }
            if state.modes.topic_lock && !state.is_op(ctx.client.id()) {
                return Err(ChannelError::ChanOpPrivsNeeded(channel.name().to_string()).into());
            }
            if text.is_empty() {
                state.topic = None;
            } else {
                state.set_topic(text.clone(), nick);
            }
        }

        channel.broadcast(format!(":{} TOPIC {} :{text}", ctx.mask(), channel.name()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{Harness, drain};

    #[tokio::test]
    async fn test_topic_lock_and_query() {
        let h = Harness::new();
        let (alice, mut ra) = h.registered(1, "alice");
        let (bob, mut rb) = h.registered(2, "bob");
        h.run(&alice, "JOIN #t").await.unwrap();
        h.run(&bob, "JOIN #t").await.unwrap();
        drain(&mut ra);
        drain(&mut rb);

        h.run(&bob, "TOPIC #t :mine now").await.unwrap_err();
        assert_eq!(
            drain(&mut rb),
            vec![":irc.test 482 bob #t :You're not channel operator"]
        );

        h.run(&alice, "TOPIC #t :welcome").await.unwrap();
        assert_eq!(drain(&mut ra), vec![":alice!alice@127.0.0.1 TOPIC #t :welcome"]);
        assert_eq!(drain(&mut rb), vec![":alice!alice@127.0.0.1 TOPIC #t :welcome"]);

        h.run(&bob, "TOPIC #t").await.unwrap();
        let lines = drain(&mut rb);
        assert_eq!(lines[0], ":irc.test 332 bob #t :welcome");
        assert!(lines[1].starts_with(":irc.test 333 bob #t alice "));
    }

    #[tokio::test]
    async fn test_topic_truncated_on_char_boundary() {
        let h = Harness::new();
        let (alice, mut ra) = h.registered(1, "alice");
        h.run(&alice, "JOIN #t").await.unwrap();
        drain(&mut ra);

        let long = "é".repeat(200);
        h.run(&alice, &format!("TOPIC #t :{long}")).await.unwrap();
        let topic = h.matrix.lookup_channel("#t").unwrap().read().topic.clone().unwrap();
        assert_eq!(topic.text.len(), 306);
        assert_eq!(topic.set_by, "alice");
    }

    #[tokio::test]
    async fn test_topic_errors() {
        let h = Harness::new();
        let (alice, mut ra) = h.registered(1, "alice");
        let (bob, mut rb) = h.registered(2, "bob");
        h.run(&alice, "JOIN #t").await.unwrap();
        drain(&mut ra);

        h.run(&bob, "TOPIC").await.unwrap_err();
        h.run(&bob, "TOPIC #none").await.unwrap_err();
        h.run(&bob, "TOPIC #t").await.unwrap_err();
        assert_eq!(
            drain(&mut rb),
            vec![
                ":irc.test 461 bob TOPIC :Not enough parameters",
                ":irc.test 403 bob #none :No such channel",
                ":irc.test 442 bob #t :You're not on that channel",
            ]
        );
    }
}
