//! Messaging command handlers (PRIVMSG, NOTICE).
//!
//! Both route a text to channels and nicks the same way; NOTICE never
//! generates error replies and never triggers away replies.

mod common;
mod notice;
mod privmsg;

pub use notice::NoticeHandler;
pub use privmsg::PrivmsgHandler;
