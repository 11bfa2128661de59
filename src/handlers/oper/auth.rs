//! OPER handler.

use async_trait::async_trait;
use tinyircd_proto::{Message, Response, format_mask};
use tracing::{info, warn};

use super::super::core::require_arg;
use super::super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};

/// Handler for OPER command.
///
/// `OPER name password`
///
/// Authenticates a user as an IRC operator.
pub struct OperHandler;

#[async_trait]
impl Handler for OperHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let name = require_arg(msg, 0)?;
        let password = require_arg(msg, 1)?;
        let nick = ctx.nick();

        let Some(block) = ctx.matrix.config.oper.iter().find(|b| b.name == name) else {
            warn!(nick = %nick, oper_name = %name, "OPER failed: unknown oper name");
            return Err(HandlerError::PasswordMismatch);
        };

        if !block.verify_password(password) {
            warn!(nick = %nick, oper_name = %name, "OPER failed: incorrect password");
            return Err(HandlerError::PasswordMismatch);
        }

        // Host restrictions apply to the real host, not a previous vhost.
        let real_mask = {
            let state = ctx.client.state();
            format_mask(&state.nick, &state.user, &state.host)
        };
        if !block.host_allows(&real_mask) {
            warn!(nick = %nick, oper_name = %name, mask = %real_mask, "OPER failed: host mismatch");
            return Err(HandlerError::NoOperHost);
        }

        {
            let mut state = ctx.client.state_mut();
            state.modes.oper = true;
            state.vhost = block.vhost.clone();
            state.whois_note = block.whois.clone();
        }

        info!(nick = %nick, oper_name = %name, "OPER succeeded");
        ctx.reply(Response::RPL_YOUREOPER, ":You are now an IRC operator");
        ctx.send(format!(":{nick} MODE {nick} :+o"));
        Ok(())
    }
}
