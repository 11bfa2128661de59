//! PING and PONG handlers.

use async_trait::async_trait;
use tinyircd_proto::Message;

use super::super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};

/// Handler for PING command.
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        // PING <token>
        let token = msg.nonempty_arg(0).ok_or(HandlerError::NoOrigin)?;
        let server = ctx.server_name();
        ctx.send(format!(":{server} PONG {server} :{token}"));
        Ok(())
    }

    fn requires_registration(&self) -> bool {
        false
    }
}

/// Handler for PONG command.
pub struct PongHandler;

#[async_trait]
impl Handler for PongHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _msg: &Message) -> HandlerResult {
        // No reply; only the idle clock moves.
        ctx.client.touch();
        Ok(())
    }

    fn requires_registration(&self) -> bool {
        false
    }
}
