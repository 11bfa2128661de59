//! USER command handler.
//!
//! # Syntax
//!
//! `USER <username> <mode> <unused> :<realname>`

use async_trait::async_trait;
use tinyircd_proto::Message;

use super::super::{Context, Handler};
use super::welcome::try_complete_registration;
use crate::error::{HandlerError, HandlerResult};

/// Handler for USER command.
pub struct UserHandler;

#[async_trait]
impl Handler for UserHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        if ctx.client.is_registered() {
            return Err(HandlerError::AlreadyRegistered);
        }
        if msg.params.len() < 4 {
            return Err(HandlerError::NeedMoreParams);
        }
        let username = msg.nonempty_arg(0).ok_or(HandlerError::NeedMoreParams)?;

        {
            let mut state = ctx.client.state_mut();
            state.user = username.to_string();
            state.realname = msg.params[3].clone();
        }

        try_complete_registration(ctx);
        Ok(())
    }

    fn requires_registration(&self) -> bool {
        false
    }
}
