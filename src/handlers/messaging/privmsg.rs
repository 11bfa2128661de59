//! PRIVMSG command handler.
//!
//! # Syntax
//!
//! `PRIVMSG <target>{,<target>} :<text>`
//!
//! A failure for one target is reported and the remaining targets are still
//! delivered.

use async_trait::async_trait;
use tinyircd_proto::Message;

use super::super::{Context, Handler};
use super::common::{RouteOptions, parse_outgoing, route};
use crate::error::HandlerResult;

const OPTIONS: RouteOptions = RouteOptions {
    command: "PRIVMSG",
    send_away_reply: true,
};

/// Handler for PRIVMSG command.
pub struct PrivmsgHandler;

#[async_trait]
impl Handler for PrivmsgHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let outgoing = parse_outgoing(msg)?;
        for target in outgoing.targets {
            if let Err(e) = route(ctx, target, outgoing.text, OPTIONS) {
                ctx.send_error(&e, OPTIONS.command);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{Harness, drain};

    #[tokio::test]
    async fn test_channel_message_skips_sender() {
        let h = Harness::new();
        let (alice, mut ra) = h.registered(1, "alice");
        let (bob, mut rb) = h.registered(2, "bob");
        let (carol, mut rc) = h.registered(3, "carol");
        for c in [&alice, &bob, &carol] {
            h.run(c, "JOIN #chat").await.unwrap();
        }
        drain(&mut ra);
        drain(&mut rb);
        drain(&mut rc);

        h.run(&alice, "PRIVMSG #chat :hello there").await.unwrap();
        assert!(drain(&mut ra).is_empty());
        let line = ":alice!alice@127.0.0.1 PRIVMSG #chat :hello there";
        assert_eq!(drain(&mut rb), vec![line]);
        assert_eq!(drain(&mut rc), vec![line]);
    }

    #[tokio::test]
    async fn test_moderated_channel() {
        let h = Harness::new();
        let (alice, mut ra) = h.registered(1, "alice");
        let (bob, mut rb) = h.registered(2, "bob");
        h.run(&alice, "JOIN #test").await.unwrap();
        h.run(&bob, "JOIN #test").await.unwrap();
        h.run(&alice, "MODE #test +m").await.unwrap();
        drain(&mut ra);
        drain(&mut rb);

        h.run(&bob, "PRIVMSG #test :hi").await.unwrap();
        assert_eq!(
            drain(&mut rb),
            vec![":irc.test 404 bob #test :Cannot send to channel (+m)"]
        );
        assert!(drain(&mut ra).is_empty());

        h.run(&alice, "MODE #test +v bob").await.unwrap();
        drain(&mut ra);
        h.run(&bob, "PRIVMSG #test :hi").await.unwrap();
        assert_eq!(drain(&mut ra), vec![":bob!bob@127.0.0.1 PRIVMSG #test :hi"]);
    }

    #[tokio::test]
    async fn test_no_external_messages() {
        let h = Harness::new();
        let (alice, mut ra) = h.registered(1, "alice");
        let (bob, mut rb) = h.registered(2, "bob");
        h.run(&alice, "JOIN #n").await.unwrap();
        drain(&mut ra);

        h.run(&bob, "PRIVMSG #n :knock knock").await.unwrap();
        assert_eq!(
            drain(&mut rb),
            vec![":irc.test 404 bob #n :Cannot send to channel"]
        );

        h.run(&alice, "MODE #n -n").await.unwrap();
        drain(&mut ra);
        h.run(&bob, "PRIVMSG #n :knock knock").await.unwrap();
        assert_eq!(drain(&mut ra), vec![":bob!bob@127.0.0.1 PRIVMSG #n :knock knock"]);
    }

    #[tokio::test]
    async fn test_private_message_and_away() {
        let h = Harness::new();
        let (alice, mut ra) = h.registered(1, "alice");
        let (bob, mut rb) = h.registered(2, "bob");

        h.run(&bob, "AWAY :lunch").await.unwrap();
        drain(&mut rb);

        h.run(&alice, "PRIVMSG Bob,ghost,#none :psst").await.unwrap();
        assert_eq!(drain(&mut rb), vec![":alice!alice@127.0.0.1 PRIVMSG bob :psst"]);
        assert_eq!(
            drain(&mut ra),
            vec![
                ":irc.test 301 alice bob :lunch",
                ":irc.test 401 alice ghost :No such nick/channel",
                ":irc.test 403 alice #none :No such channel",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_recipient_or_text() {
        let h = Harness::new();
        let (alice, mut ra) = h.registered(1, "alice");
        h.run(&alice, "PRIVMSG").await.unwrap_err();
        h.run(&alice, "PRIVMSG bob").await.unwrap_err();
        assert_eq!(
            drain(&mut ra),
            vec![
                ":irc.test 411 alice :No recipient given (PRIVMSG)",
                ":irc.test 412 alice :No text to send",
            ]
        );
    }
}
