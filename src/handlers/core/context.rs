//! Command handler context and the [`Handler`] trait.
//!
//! A [`Context`] bundles the requesting client with the shared [`Matrix`]. It
//! lives for the duration of one dispatched command and is the only thing a
//! handler gets besides the decoded message.

use std::sync::Arc;

use async_trait::async_trait;
use tinyircd_proto::{Message, Response};

use crate::error::{HandlerError, HandlerResult};
use crate::state::{Client, Matrix};

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// The client that sent the command.
    pub client: &'a Arc<Client>,
    /// Shared server state.
    pub matrix: &'a Arc<Matrix>,
}

impl<'a> Context<'a> {
    pub fn new(client: &'a Arc<Client>, matrix: &'a Arc<Matrix>) -> Self {
        Self { client, matrix }
    }

    #[inline]
    pub fn server_name(&self) -> &str {
        self.matrix.server_name()
    }

    /// The requester's nick, or `*` before one is accepted.
    pub fn nick(&self) -> String {
        self.client.state().nick_or_star().to_string()
    }

    /// The requester's `nick!user@host` as seen by others.
    pub fn mask(&self) -> String {
        self.client.mask()
    }

    /// Queue a raw line to the requester.
    #[inline]
    pub fn send(&self, line: impl Into<Arc<str>>) {
        self.client.send(line);
    }

    /// Send `:<server> <code> <nick> <text>` to the requester.
    pub fn reply(&self, response: Response, text: &str) {
        self.client
            .send_reply(self.matrix.server_name(), response, text);
    }

    /// Report an error for one target of a multi-target command and carry on.
    pub fn send_error(&self, err: &HandlerError, cmd: &str) {
        if let Some(line) = err.to_reply(self.server_name(), &self.nick(), cmd) {
            self.send(line);
        }
    }

    /// Fail with 481 unless the requester is an IRC operator.
    pub fn require_oper(&self) -> HandlerResult {
        if self.client.is_oper() {
            Ok(())
        } else {
            Err(HandlerError::NoPrivileges)
        }
    }
}

/// A command handler.
///
/// Handlers are unit structs registered once in the [`Registry`](super::Registry).
/// A returned error becomes exactly one numeric reply to the requester.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult;

    /// Whether the command is refused with 451 before registration.
    fn requires_registration(&self) -> bool {
        true
    }
}

/// Fetch parameter `n` or fail with 461.
pub fn require_arg(msg: &Message, n: usize) -> Result<&str, HandlerError> {
    msg.nonempty_arg(n).ok_or(HandlerError::NeedMoreParams)
}
