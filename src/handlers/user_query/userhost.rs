//! USERHOST handler.
//!
//! `USERHOST <nick> *( SPACE <nick> )`, at most five nicks.

use async_trait::async_trait;
use tinyircd_proto::{Message, Response};

use super::super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};

const MAX_NICKS: usize = 5;

/// Handler for USERHOST command.
pub struct UserhostHandler;

#[async_trait]
impl Handler for UserhostHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        if msg.nonempty_arg(0).is_none() {
            return Err(HandlerError::NeedMoreParams);
        }

        let entries: Vec<String> = msg
            .params
            .iter()
            .take(MAX_NICKS)
            .filter_map(|nick| ctx.matrix.lookup_client(nick))
            .map(|client| {
                let state = client.state();
                format!(
                    "{}{}={}{}@{}",
                    state.nick,
                    if state.modes.oper { "*" } else { "" },
                    if state.away.is_some() { '-' } else { '+' },
                    state.user,
                    state.display_host()
                )
            })
            .collect();

        ctx.reply(Response::RPL_USERHOST, &format!(":{}", entries.join(" ")));
        Ok(())
    }
}
