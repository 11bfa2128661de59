//! State management module.
//!
//! Contains the Matrix (shared server state) and the entities it indexes.

mod channel;
mod client;
pub mod dashmap_ext;
mod matrix;
mod uid;

pub use channel::{Channel, ChannelModes, ChannelState, MemberModes, is_valid_ban_mask};
pub use client::{Client, UserModes};
pub use matrix::{Matrix, ShutdownRequest};
pub use uid::{ClientId, ClientIdGenerator};
