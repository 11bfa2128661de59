//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions and loading (Config, ServerConfig, ChannelsConfig, LoggingConfig)
//! - [`listen`]: Network listener configuration (ListenConfig)
//! - [`limits`]: Per-client and per-channel limits (LimitsConfig)
//! - [`oper`]: Operator blocks (OperBlock)
//! - [`validation`]: Semantic checks run after parsing

mod limits;
mod listen;
mod oper;
mod types;
mod validation;

pub use types::{Config, LogFormat, LoggingConfig};
