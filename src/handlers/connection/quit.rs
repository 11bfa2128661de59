//! QUIT command handler.
//!
//! # Syntax
//!
//! `QUIT [:<reason>]`
//!
//! # Behavior
//!
//! The client gets `ERROR :Closing Link`, its connection task then runs the
//! normal disconnect path, which shows co-members `:<mask> QUIT :<reason>`.

use async_trait::async_trait;
use tinyircd_proto::Message;
use tracing::info;

use super::super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};

/// Handler for QUIT command.
pub struct QuitHandler;

#[async_trait]
impl Handler for QuitHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let reason = msg.nonempty_arg(0).unwrap_or("Client Quit").to_string();
        let host = ctx.client.state().host.clone();

        info!(client = ctx.client.id(), nick = %ctx.nick(), reason = %reason, "Client quit");

        ctx.send(format!("ERROR :Closing Link: {host} ({reason})"));
        ctx.client.close_with(reason.clone());

        // Signal quit by returning Quit error that connection loop will handle
        Err(HandlerError::Quit(Some(reason)))
    }

    fn requires_registration(&self) -> bool {
        false
    }
}
