//! Core handler infrastructure.
//!
//! This module contains the [`Handler`] trait, the per-command [`Context`] and
//! the [`Registry`] that maps verbs to handlers.

pub mod context;
pub mod registry;

pub use context::{Context, Handler, require_arg};
pub use registry::Registry;
