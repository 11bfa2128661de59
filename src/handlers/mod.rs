//! IRC command handlers.
//!
//! This module contains the Handler trait and command registry for dispatching
//! incoming IRC messages to appropriate handlers. Handlers receive the decoded
//! [`Message`](tinyircd_proto::Message); use `msg.arg(n)` to access parameters.

mod channel;
mod connection;
mod core;
mod helpers;
mod messaging;
mod mode;
mod oper;
mod user_query;
mod user_status;

pub use self::core::{Context, Handler, Registry, require_arg};
pub use helpers::{expand_ban_mask, server_notice};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use tinyircd_proto::Message;
    use tokio::sync::mpsc;

    use super::{Context, Registry};
    use crate::config::Config;
    use crate::error::{HandlerError, HandlerResult};
    use crate::state::test_support::client_with_queue;
    use crate::state::{Client, ClientId, Matrix};

    pub const BASE_CONFIG: &str = "[server]\nname = \"irc.test\"\nnetwork = \"TestNet\"\n";

    /// A matrix and registry driven the way a connection loop drives them.
    pub struct Harness {
        pub matrix: Arc<Matrix>,
        pub registry: Registry,
    }

    impl Harness {
        pub fn new() -> Self {
            Self::with_config("")
        }

        /// Base config with `extra` TOML appended.
        pub fn with_config(extra: &str) -> Self {
            let config =
                Config::from_toml(&format!("{BASE_CONFIG}{extra}")).expect("test config");
            Self::from_config(config)
        }

        pub fn from_config(config: Config) -> Self {
            Self {
                matrix: Arc::new(Matrix::new(config)),
                registry: Registry::new(),
            }
        }

        /// A session that has not sent NICK or USER.
        pub fn connected(&self, id: ClientId) -> (Arc<Client>, mpsc::Receiver<Arc<str>>) {
            let (client, rx) = client_with_queue(id, 256);
            self.matrix.register_session(client.clone());
            (client, rx)
        }

        /// A registered session holding `nick`, with no welcome burst queued.
        pub fn registered(&self, id: ClientId, nick: &str) -> (Arc<Client>, mpsc::Receiver<Arc<str>>) {
            let (client, rx) = self.connected(id);
            self.matrix
                .register_nick(&client, nick)
                .expect("nick available");
            {
                let mut state = client.state_mut();
                state.user = nick.to_string();
                state.realname = format!("{nick} real");
            }
            assert!(client.try_register());
            (client, rx)
        }

        /// Parse and dispatch one line, sending error replies like the connection loop.
        pub async fn run(&self, client: &Arc<Client>, line: &str) -> HandlerResult {
            let msg = Message::parse(line).expect("test line parses");
            let mut ctx = Context::new(client, &self.matrix);
            let result = self.registry.dispatch(&mut ctx, &msg).await;
            if let Err(ref e) = result
                && !matches!(e, HandlerError::Quit(_))
            {
                let nick = client.state().nick_or_star().to_string();
                if let Some(reply) = e.to_reply(self.matrix.server_name(), &nick, &msg.command) {
                    client.send(reply);
                }
            }
            result
        }
    }

    /// Everything queued so far, as strings.
    pub fn drain(rx: &mut mpsc::Receiver<Arc<str>>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(line) = rx.try_recv() {
            out.push(line.to_string());
        }
        out
    }
}
