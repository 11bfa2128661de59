//! # tinyircd-proto
//!
//! Wire-level building blocks for the tinyircd daemon. Nothing in here knows
//! about server state: it parses and formats protocol lines, frames them on a
//! byte stream, matches `nick!user@host` masks and parses mode strings.
//!
//! ```rust
//! use tinyircd_proto::{Message, Mask};
//!
//! let msg = Message::parse("privmsg #rust :hello there\r\n").expect("valid line");
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.params, vec!["#rust", "hello there"]);
//!
//! let ban = Mask::compile("*!*@192.168.*").expect("valid mask");
//! assert!(ban.is_match("alice!bob@192.168.1.5"));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod error;
pub mod line;
pub mod mask;
pub mod message;
pub mod mode;
pub mod names;
pub mod response;

pub use self::casemap::{irc_eq, irc_lower_char, irc_to_lower};
pub use self::error::{MaskError, ProtocolError};
pub use self::line::{DEFAULT_MAX_LINE_LEN, LineCodec};
pub use self::mask::{
    Mask, MaskParts, format_mask, matches_host, matches_user_mask, parse_mask, validate_mask,
};
pub use self::message::Message;
pub use self::mode::{ModeChange, ModeDirection, parse_channel_modes};
pub use self::names::{is_valid_channel_name, is_valid_nickname, truncate_utf8_safe};
pub use self::response::Response;
