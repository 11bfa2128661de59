//! Per-client and per-channel limits.

use serde::Deserialize;

/// Limits configuration.
///
/// Every field has a default, so an absent `[limits]` table is fine.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Longest accepted nickname in bytes (default: 16).
    #[serde(default = "default_max_nick_length")]
    pub max_nick_length: usize,
    /// Longest accepted channel name in bytes (default: 50).
    #[serde(default = "default_max_channel_name")]
    pub max_channel_name: usize,
    /// Channels a single client may be in at once (default: 20).
    #[serde(default = "default_max_channels")]
    pub max_channels: usize,
    /// Members a channel may hold regardless of +l (default: 100).
    #[serde(default = "default_max_users_per_channel")]
    pub max_users_per_channel: usize,
    /// Longest inbound line, terminator included (default: 512).
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    /// Outbound lines queued per client before it is dropped (default: 256).
    #[serde(default = "default_sendq")]
    pub sendq: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_nick_length: default_max_nick_length(),
            max_channel_name: default_max_channel_name(),
            max_channels: default_max_channels(),
            max_users_per_channel: default_max_users_per_channel(),
            max_line_length: default_max_line_length(),
            sendq: default_sendq(),
        }
    }
}

fn default_max_nick_length() -> usize {
    16
}

fn default_max_channel_name() -> usize {
    50
}

fn default_max_channels() -> usize {
    20
}

fn default_max_users_per_channel() -> usize {
    100
}

fn default_max_line_length() -> usize {
    tinyircd_proto::DEFAULT_MAX_LINE_LEN
}

fn default_sendq() -> usize {
    256
}
