//! Common test infrastructure for integration tests.
//!
//! Spawns the real `tinyircd` binary on a free port and drives it over TCP.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestServer;
