//! MODE command handler.
//!
//! - User modes: `MODE nick [+/-modes]`
//! - Channel modes: `MODE channel [+/-modes [args...]]`

mod channel;
mod common;
mod user;

use async_trait::async_trait;
use tinyircd_proto::Message;

use super::core::require_arg;
use super::{Context, Handler};
use crate::error::HandlerResult;

/// Handler for MODE command.
pub struct ModeHandler;

#[async_trait]
impl Handler for ModeHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        // MODE <target> [modes [params]]
        let target = require_arg(msg, 0)?;

        if common::is_channel_target(target) {
            channel::handle_channel_mode(ctx, target, msg)
        } else {
            user::handle_user_mode(ctx, target, msg.arg(1))
        }
    }
}
