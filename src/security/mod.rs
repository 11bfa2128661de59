//! Security helpers.
//!
//! Only credential handling lives here: operator password verification and
//! hash generation for the `--gen-password-hash` CLI mode.

pub mod password;
