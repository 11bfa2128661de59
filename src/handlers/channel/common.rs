//! Common utilities for channel command handlers.
//!
//! List parsing shared across JOIN, PART and NAMES, plus the lookups and
//! reply bursts (topic, NAMES) that several channel commands send.

use std::sync::Arc;

use tinyircd_proto::Response;

use super::super::Context;
use crate::error::{ChannelError, HandlerError};
use crate::state::{Channel, Client};

/// Room for nicks in one 353 line, leaving space for prefix and numerics.
const NAMES_CHUNK_BYTES: usize = 400;

/// Parse a comma-separated list of channel names.
/// Returns a vector of trimmed, non-empty channel name strings.
pub fn parse_channel_list(channels_str: &str) -> Vec<&str> {
    channels_str
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a comma-separated list of keys and align with channel count.
/// Empty keys are represented as None, missing keys are padded with None.
pub fn parse_key_list(keys_str: Option<&str>, channel_count: usize) -> Vec<Option<&str>> {
    let mut key_list: Vec<Option<&str>> = match keys_str {
        Some(keys) => keys
            .split(',')
            .map(|k| Some(k.trim()).filter(|k| !k.is_empty()))
            .collect(),
        None => Vec::new(),
    };
    key_list.resize(channel_count, None);
    key_list
}

/// Parse an optional part/kick reason.
/// Returns None if the reason is empty or whitespace-only.
pub fn parse_reason(reason: Option<&str>) -> Option<&str> {
    reason.map(|r| r.trim()).filter(|r| !r.is_empty())
}

/// Check if JOIN 0 syntax (leave all channels).
#[inline]
pub fn is_join_zero(channels_str: &str) -> bool {
    channels_str == "0"
}

// ============================================================================
// Lookups
// ============================================================================

/// Find a channel or fail with 403.
pub fn find_channel(ctx: &Context<'_>, name: &str) -> Result<Arc<Channel>, HandlerError> {
    ctx.matrix
        .lookup_channel(name)
        .ok_or_else(|| HandlerError::NoSuchChannel(name.to_string()))
}

/// Find a client by nick or fail with 401.
pub fn find_client(ctx: &Context<'_>, nick: &str) -> Result<Arc<Client>, HandlerError> {
    ctx.matrix
        .lookup_client(nick)
        .ok_or_else(|| HandlerError::NoSuchNick(nick.to_string()))
}

/// Find `nick` and check it is on `channel`: 401, then 441.
pub fn find_member(
    ctx: &Context<'_>,
    channel: &Channel,
    nick: &str,
) -> Result<Arc<Client>, HandlerError> {
    let target = find_client(ctx, nick)?;
    if !channel.read().is_member(target.id()) {
        return Err(ChannelError::UserNotInChannel {
            nick: target.nick(),
            channel: channel.name().to_string(),
        }
        .into());
    }
    Ok(target)
}

/// Fail with 442 unless `client` is on `channel`.
pub fn require_member(channel: &Channel, client: &Client) -> Result<(), ChannelError> {
    if channel.read().is_member(client.id()) {
        Ok(())
    } else {
        Err(ChannelError::NotOnChannel(channel.name().to_string()))
    }
}

/// Fail with 442 or 482 unless `client` is an operator on `channel`.
pub fn require_chanop(channel: &Channel, client: &Client) -> Result<(), ChannelError> {
    let state = channel.read();
    if !state.is_member(client.id()) {
        return Err(ChannelError::NotOnChannel(channel.name().to_string()));
    }
    if !state.is_op(client.id()) {
        return Err(ChannelError::ChanOpPrivsNeeded(channel.name().to_string()));
    }
    Ok(())
}

// ============================================================================
// Reply bursts
// ============================================================================

/// 332 + 333, or 331 when no topic is set.
pub fn send_topic(ctx: &Context<'_>, channel: &Channel) {
    let topic = channel.read().topic.clone();
    match topic {
        Some(topic) => {
            ctx.reply(
                Response::RPL_TOPIC,
                &format!("{} :{}", channel.name(), topic.text),
            );
            ctx.reply(
                Response::RPL_TOPICWHOTIME,
                &format!("{} {} {}", channel.name(), topic.set_by, topic.set_at),
            );
        }
        None => ctx.reply(
            Response::RPL_NOTOPIC,
            &format!("{} :No topic is set", channel.name()),
        ),
    }
}

/// 353 lines (split when long) followed by 366.
///
/// Members of a secret channel are only listed to other members.
pub fn send_names(ctx: &Context<'_>, channel: &Channel) {
    let (symbol, visible) = {
        let state = channel.read();
        let symbol = if state.modes.secret {
            '@'
        } else if state.modes.private {
            '*'
        } else {
            '='
        };
        (symbol, !state.modes.secret || state.is_member(ctx.client.id()))
    };

    if visible {
        for chunk in chunk_names(&channel.names(), NAMES_CHUNK_BYTES) {
            ctx.reply(
                Response::RPL_NAMREPLY,
                &format!("{symbol} {} :{chunk}", channel.name()),
            );
        }
    }
    ctx.reply(
        Response::RPL_ENDOFNAMES,
        &format!("{} :End of NAMES list", channel.name()),
    );
}

/// Join names with spaces, starting a new chunk before `max_bytes` is exceeded.
fn chunk_names(names: &[String], max_bytes: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for name in names {
        if !current.is_empty() && current.len() + 1 + name.len() > max_bytes {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(name);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
