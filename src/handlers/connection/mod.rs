//! Connection and registration handlers.
//!
//! Handles NICK, USER, PING, PONG, QUIT commands.

mod nick;
mod ping;
mod quit;
mod user;
mod welcome;

pub use nick::NickHandler;
pub use ping::{PingHandler, PongHandler};
pub use quit::QuitHandler;
pub use user::UserHandler;
