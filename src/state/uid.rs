//! Connection identifiers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identifier of one client connection.
pub type ClientId = u64;

/// Hands out increasing [`ClientId`]s, starting at 1.
///
/// Ids are never reused for the life of the process, so a stale id can never
/// alias a newer connection.
#[derive(Debug)]
pub struct ClientIdGenerator {
    counter: AtomicU64,
}

impl Default for ClientIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientIdGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }

    /// Generate the next id.
    pub fn next(&self) -> ClientId {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}
