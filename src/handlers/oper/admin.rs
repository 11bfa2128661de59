//! SHUTDOWN and RESTART handlers.
//!
//! Both only file a request with the matrix; the process root performs the
//! drain (and, for RESTART, the re-exec) outside any session task.

use async_trait::async_trait;
use tinyircd_proto::Message;
use tracing::{info, warn};

use super::super::{Context, Handler};
use crate::error::HandlerResult;
use crate::state::ShutdownRequest;

/// Handler for SHUTDOWN command.
///
/// `SHUTDOWN [:<reason>]`
pub struct ShutdownHandler;

#[async_trait]
impl Handler for ShutdownHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        ctx.require_oper()?;
        let reason = msg.nonempty_arg(0).map(str::to_string);
        info!(oper = %ctx.nick(), reason = ?reason, "SHUTDOWN requested");
        file_request(ctx, ShutdownRequest::shutdown(reason));
        Ok(())
    }
}

/// Handler for RESTART command.
///
/// `RESTART [:<reason>]`
pub struct RestartHandler;

#[async_trait]
impl Handler for RestartHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        ctx.require_oper()?;
        let reason = msg.nonempty_arg(0).map(str::to_string);
        info!(oper = %ctx.nick(), reason = ?reason, "RESTART requested");
        file_request(ctx, ShutdownRequest::restart(reason));
        Ok(())
    }
}

fn file_request(ctx: &Context<'_>, request: ShutdownRequest) {
    if !ctx.matrix.request_shutdown(request) {
        warn!(oper = %ctx.nick(), "Shutdown already in progress");
    }
}
