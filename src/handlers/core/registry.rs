//! Command handler registry and dispatch.
//!
//! The table is built once in [`Registry::new`] and read-only afterwards.

use std::collections::HashMap;

use tinyircd_proto::{Message, Response};
use tracing::{Instrument, debug};

use super::context::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{
    channel::{
        BanHandler, DeopHandler, InviteHandler, JoinHandler, KickHandler, ListHandler,
        NamesHandler, OpHandler, PartHandler, TopicHandler,
    },
    connection::{NickHandler, PingHandler, PongHandler, QuitHandler, UserHandler},
    messaging::{NoticeHandler, PrivmsgHandler},
    mode::ModeHandler,
    oper::{
        KillHandler, OperBanHandler, OperGiveHandler, OperHandler, OperRemoveHandler,
        RestartHandler, ShutdownHandler,
    },
    user_query::{UserhostHandler, WhoHandler, WhoisHandler},
    user_status::AwayHandler,
};
use crate::telemetry::spans;

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        // Connection/registration handlers
        handlers.insert("NICK", Box::new(NickHandler));
        handlers.insert("USER", Box::new(UserHandler));
        handlers.insert("PING", Box::new(PingHandler));
        handlers.insert("PONG", Box::new(PongHandler));
        handlers.insert("QUIT", Box::new(QuitHandler));

        // Channel handlers
        handlers.insert("JOIN", Box::new(JoinHandler));
        handlers.insert("PART", Box::new(PartHandler));
        handlers.insert("TOPIC", Box::new(TopicHandler));
        handlers.insert("NAMES", Box::new(NamesHandler));
        handlers.insert("LIST", Box::new(ListHandler));
        handlers.insert("INVITE", Box::new(InviteHandler));
        handlers.insert("KICK", Box::new(KickHandler));
        handlers.insert("OP", Box::new(OpHandler));
        handlers.insert("DEOP", Box::new(DeopHandler));
        handlers.insert("BAN", Box::new(BanHandler));

        // Messaging handlers
        handlers.insert("PRIVMSG", Box::new(PrivmsgHandler));
        handlers.insert("NOTICE", Box::new(NoticeHandler));

        // Mode handler
        handlers.insert("MODE", Box::new(ModeHandler));

        // User query handlers
        handlers.insert("WHO", Box::new(WhoHandler));
        handlers.insert("WHOIS", Box::new(WhoisHandler));
        handlers.insert("USERHOST", Box::new(UserhostHandler));
        handlers.insert("AWAY", Box::new(AwayHandler));

        // Operator handlers
        handlers.insert("OPER", Box::new(OperHandler));
        handlers.insert("KILL", Box::new(KillHandler));
        handlers.insert("SHUTDOWN", Box::new(ShutdownHandler));
        handlers.insert("RESTART", Box::new(RestartHandler));
        handlers.insert("OPERBAN", Box::new(OperBanHandler));
        handlers.insert("OPERGIVE", Box::new(OperGiveHandler));
        handlers.insert("OPERREMOVE", Box::new(OperRemoveHandler));

        Self { handlers }
    }

    /// Dispatch a message to the appropriate handler.
    ///
    /// Unknown commands get 421 and succeed. Errors are returned to the
    /// caller, which turns them into numeric replies.
    pub async fn dispatch(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let cmd_name = msg.command.as_str();

        let Some(handler) = self.handlers.get(cmd_name) else {
            ctx.reply(
                Response::ERR_UNKNOWNCOMMAND,
                &format!("{cmd_name} :Unknown command"),
            );
            return Ok(());
        };

        if handler.requires_registration() && !ctx.client.is_registered() {
            return Err(HandlerError::NotRegistered);
        }

        let span = spans::command(cmd_name, ctx.client.id(), &ctx.nick());
        let result = handler.handle(ctx, msg).instrument(span).await;

        if let Err(ref e) = result {
            debug!(command = %cmd_name, error = %e, code = e.error_code(), "Command error");
        }

        result
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
