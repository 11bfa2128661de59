//! Operator command handlers split into submodules.
//!
//! Everything except OPER itself answers 481 to non-operators before looking
//! at its parameters.

mod admin;
mod auth;
mod chanmgmt;
mod kill;

pub use admin::{RestartHandler, ShutdownHandler};
pub use auth::OperHandler;
pub use chanmgmt::{OperBanHandler, OperGiveHandler, OperRemoveHandler};
pub use kill::KillHandler;
