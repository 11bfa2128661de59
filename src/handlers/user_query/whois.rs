//! WHOIS handler for detailed user information queries.

use async_trait::async_trait;
use tinyircd_proto::{Message, Response};

use super::super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::state::Client;

/// Handler for WHOIS command.
///
/// `WHOIS [server] nickmask`
///
/// Returns detailed information about a specific user.
pub struct WhoisHandler;

#[async_trait]
impl Handler for WhoisHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        // WHOIS [server] <nick>
        let target = if msg.params.len() >= 2 {
            msg.arg(1)
        } else {
            msg.arg(0)
        }
        .filter(|t| !t.is_empty())
        .ok_or(HandlerError::NoNicknameGiven)?;

        let client = ctx
            .matrix
            .lookup_client(target)
            .ok_or_else(|| HandlerError::NoSuchNick(target.to_string()))?;

        // Channels are listed before taking the state lock.
        let channels = visible_channels(ctx, &client);
        let mut replies = Vec::with_capacity(8);
        {
            let state = client.state();
            let nick = state.nick.as_str();

            replies.push((
                Response::RPL_WHOISUSER,
                format!(
                    "{nick} {} {} * :{}",
                    state.user,
                    state.display_host(),
                    state.realname
                ),
            ));
            if !channels.is_empty() {
                replies.push((
                    Response::RPL_WHOISCHANNELS,
                    format!("{nick} :{}", channels.join(" ")),
                ));
            }
            replies.push((
                Response::RPL_WHOISSERVER,
                format!(
                    "{nick} {} :{}",
                    ctx.server_name(),
                    ctx.matrix.server_info.description
                ),
            ));
            if let Some(away) = &state.away {
                replies.push((Response::RPL_AWAY, format!("{nick} :{away}")));
            }
            if state.modes.oper {
                replies.push((
                    Response::RPL_WHOISOPERATOR,
                    format!("{nick} :is an IRC operator"),
                ));
            }
            if let Some(note) = &state.whois_note {
                replies.push((Response::RPL_WHOISSPECIAL, format!("{nick} :{note}")));
            }
            replies.push((
                Response::RPL_WHOISIDLE,
                format!(
                    "{nick} {} {} :seconds idle, signon time",
                    client.idle_secs(),
                    client.signon()
                ),
            ));
            replies.push((
                Response::RPL_ENDOFWHOIS,
                format!("{nick} :End of WHOIS list"),
            ));
        }

        for (response, text) in replies {
            ctx.reply(response, &text);
        }
        Ok(())
    }
}

/// `<prefix><channel>` for each channel of `target` the requester may see.
fn visible_channels(ctx: &Context<'_>, target: &Client) -> Vec<String> {
    let mut out: Vec<String> = target
        .channels()
        .into_iter()
        .filter_map(|channel| {
            let state = channel.read();
            if state.modes.secret && !state.is_member(ctx.client.id()) {
                return None;
            }
            let prefix = state
                .member_modes(target.id())
                .and_then(|m| m.prefix_char())
                .map(String::from)
                .unwrap_or_default();
            Some(format!("{prefix}{}", channel.name()))
        })
        .collect();
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{Harness, drain};

    #[tokio::test]
    async fn test_whois_full_burst() {
        let h = Harness::new();
        let (alice, mut ra) = h.registered(1, "alice");
        let (bob, mut rb) = h.registered(2, "bob");
        h.run(&bob, "JOIN #open").await.unwrap();
        h.run(&bob, "JOIN #hidden").await.unwrap();
        h.run(&bob, "MODE #hidden +s").await.unwrap();
        h.run(&bob, "AWAY :gone fishing").await.unwrap();
        {
            let mut state = bob.state_mut();
            state.modes.oper = true;
            state.whois_note = Some("is a Server Administrator".into());
        }
        drain(&mut rb);

        h.run(&alice, "WHOIS BOB").await.unwrap();
        let lines = drain(&mut ra);
        assert_eq!(lines[0], ":irc.test 311 alice bob bob 127.0.0.1 * :bob real");
        assert_eq!(lines[1], ":irc.test 319 alice bob :@#open");
        assert!(lines[2].starts_with(":irc.test 312 alice bob irc.test :"));
        assert_eq!(lines[3], ":irc.test 301 alice bob :gone fishing");
        assert_eq!(lines[4], ":irc.test 313 alice bob :is an IRC operator");
        assert_eq!(lines[5], ":irc.test 320 alice bob :is a Server Administrator");
        assert!(lines[6].starts_with(":irc.test 317 alice bob "));
        assert!(lines[6].ends_with(" :seconds idle, signon time"));
        assert_eq!(lines[7], ":irc.test 318 alice bob :End of WHOIS list");
        assert_eq!(lines.len(), 8);
    }

    #[tokio::test]
    async fn test_whois_unknown_and_missing() {
        let h = Harness::new();
        let (alice, mut ra) = h.registered(1, "alice");

        h.run(&alice, "WHOIS ghost").await.unwrap_err();
        h.run(&alice, "WHOIS").await.unwrap_err();
        assert_eq!(
            drain(&mut ra),
            vec![
                ":irc.test 401 alice ghost :No such nick/channel",
                ":irc.test 431 alice :No nickname given",
            ]
        );
    }
}
