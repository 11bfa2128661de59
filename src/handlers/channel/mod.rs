//! Channel command handlers.
//!
//! Handles JOIN, PART, TOPIC, NAMES, LIST, INVITE, KICK and the channel
//! operator shortcuts OP, DEOP and BAN.

pub(super) mod common;
mod invite;
mod join;
mod kick;
mod list;
mod names;
mod ops;
mod part;
mod topic;

pub use invite::InviteHandler;
pub use join::JoinHandler;
pub use kick::KickHandler;
pub use list::ListHandler;
pub use names::NamesHandler;
pub use ops::{BanHandler, DeopHandler, OpHandler};
pub use part::PartHandler;
pub use topic::TopicHandler;
