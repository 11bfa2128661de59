//! NOTICE command handler.
//!
//! Per RFC 2812, NOTICE errors are silently ignored (no error replies).

use async_trait::async_trait;
use tinyircd_proto::Message;
use tracing::debug;

use super::super::{Context, Handler};
use super::common::{RouteOptions, parse_outgoing, route};
use crate::error::HandlerResult;

const OPTIONS: RouteOptions = RouteOptions {
    command: "NOTICE",
    send_away_reply: false,
};

/// Handler for NOTICE command.
pub struct NoticeHandler;

#[async_trait]
impl Handler for NoticeHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Ok(outgoing) = parse_outgoing(msg) else {
            return Ok(());
        };
        for target in outgoing.targets {
            if let Err(e) = route(ctx, target, outgoing.text, OPTIONS) {
                debug!(target = %target, error = %e, "NOTICE dropped");
            }
        }
        Ok(())
    }
}
