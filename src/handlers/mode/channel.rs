//! Channel mode handling.
//!
//! Handles MODE commands for channels: `MODE <channel> [+/-modes [args...]]`.
//! Changes are applied left to right under the channel's write lock; each
//! rejected change is reported on its own and the rest still apply.

use std::sync::Arc;

use tinyircd_proto::{Message, ModeChange, ModeDirection, Response, parse_channel_modes};
use tracing::debug;

use super::super::channel::common::{find_channel, require_chanop};
use super::super::{Context, expand_ban_mask};
use super::common::ModeLine;
use crate::error::{ChannelError, HandlerError, HandlerResult};
use crate::state::{Channel, ChannelState, Client, ClientId, is_valid_ban_mask};

/// Handle channel mode query/change.
pub fn handle_channel_mode(ctx: &Context<'_>, target: &str, msg: &Message) -> HandlerResult {
    let channel = find_channel(ctx, target)?;

    let Some(modes) = msg.nonempty_arg(1) else {
        send_mode_is(ctx, &channel);
        return Ok(());
    };

    let args = msg.params.get(2..).unwrap_or_default();
    if is_ban_list_query(modes, args) {
        send_ban_list(ctx, &channel);
        return Ok(());
    }

    require_chanop(&channel, ctx.client)?;

    let changes = parse_channel_modes(modes, args);
    let resolved = resolve_targets(ctx, &changes);
    let setter = ctx.nick();

    let (applied, errors) = {
        let mut state = channel.write();
        apply_changes(&mut state, channel.name(), &setter, changes, resolved)
    };

    for err in &errors {
        ctx.send_error(err, "MODE");
    }

    if !applied.is_empty() {
        let rendered = applied.render();
        debug!(channel = %channel.name(), modes = %rendered, "Channel modes changed");
        channel.broadcast(format!(":{} MODE {} {rendered}", ctx.mask(), channel.name()));
    }
    Ok(())
}

/// `b` or `+b` with no mask lists bans and needs no privileges.
fn is_ban_list_query(modes: &str, args: &[String]) -> bool {
    args.is_empty() && matches!(modes, "b" | "+b")
}

/// 324 + 329.
fn send_mode_is(ctx: &Context<'_>, channel: &Channel) {
    let modes = channel.read().modes.as_mode_string_with_params();
    ctx.reply(
        Response::RPL_CHANNELMODEIS,
        &format!("{} {modes}", channel.name()),
    );
    ctx.reply(
        Response::RPL_CREATIONTIME,
        &format!("{} {}", channel.name(), channel.created()),
    );
}

/// 367 per ban, then 368.
fn send_ban_list(ctx: &Context<'_>, channel: &Channel) {
    let bans = channel.read().bans().to_vec();
    for ban in bans {
        ctx.reply(
            Response::RPL_BANLIST,
            &format!("{} {} {} {}", channel.name(), ban.mask, ban.set_by, ban.set_at),
        );
    }
    ctx.reply(
        Response::RPL_ENDOFBANLIST,
        &format!("{} :End of channel ban list", channel.name()),
    );
}

/// What a change refers to outside the channel, looked up before the channel
/// lock is taken.
enum Resolved {
    None,
    Client(Option<Arc<Client>>),
    BanMask(String),
}

fn resolve_targets(ctx: &Context<'_>, changes: &[ModeChange]) -> Vec<Resolved> {
    changes
        .iter()
        .map(|change| match change {
            ModeChange::Op(_, nick) | ModeChange::Voice(_, nick) => {
                Resolved::Client(ctx.matrix.lookup_client(nick))
            }
            ModeChange::Ban(_, arg) => Resolved::BanMask(expand_ban_mask(ctx.matrix, arg)),
            _ => Resolved::None,
        })
        .collect()
}

fn apply_changes(
    state: &mut ChannelState,
    channel: &str,
    setter: &str,
    changes: Vec<ModeChange>,
    resolved: Vec<Resolved>,
) -> (ModeLine, Vec<HandlerError>) {
    let mut applied = ModeLine::default();
    let mut errors = Vec::new();

    for (change, resolved) in changes.into_iter().zip(resolved) {
        let direction = change.direction();
        let add = direction == ModeDirection::Add;

        let result = match (change, resolved) {
            (ModeChange::Flag(_, letter), _) => {
                if state.modes.flag(letter) != add {
                    state.modes.set_flag(letter, add);
                    applied.push(direction, letter, None);
                }
                Ok(())
            }
            (ModeChange::Op(_, nick), Resolved::Client(client)) => {
                apply_member_mode(state, channel, &nick, client, |s, id| s.set_op(id, add))
                    .map(|nick| applied.push(direction, 'o', Some(nick)))
            }
            (ModeChange::Voice(_, nick), Resolved::Client(client)) => {
                apply_member_mode(state, channel, &nick, client, |s, id| s.set_voice(id, add))
                    .map(|nick| applied.push(direction, 'v', Some(nick)))
            }
            (ModeChange::Ban(..), Resolved::BanMask(mask)) => {
                if !is_valid_ban_mask(&mask) {
                    Err(HandlerError::InvalidParam("Invalid ban mask"))
                } else {
                    let changed = if add {
                        state.add_ban(&mask, setter)
                    } else {
                        state.remove_ban(&mask)
                    };
                    if changed {
                        applied.push(direction, 'b', Some(mask));
                    }
                    Ok(())
                }
            }
            (ModeChange::Key(ModeDirection::Add, Some(key)), _) => {
                if state.modes.key.is_some() {
                    Err(ChannelError::KeySet(channel.to_string()).into())
                } else {
                    state.modes.key = Some(key.clone());
                    applied.push(direction, 'k', Some(key));
                    Ok(())
                }
            }
            (ModeChange::Key(ModeDirection::Remove, _), _) => {
                if let Some(old) = state.modes.key.take() {
                    applied.push(direction, 'k', Some(old));
                }
                Ok(())
            }
            (ModeChange::Limit(ModeDirection::Add, Some(raw)), _) => {
                match raw.parse::<u32>() {
                    Ok(limit) if limit > 0 => {
                        state.modes.limit = Some(limit);
                        applied.push(direction, 'l', Some(limit.to_string()));
                        Ok(())
                    }
                    _ => Err(HandlerError::InvalidParam("Invalid limit")),
                }
            }
            (ModeChange::Limit(ModeDirection::Remove, _), _) => {
                if state.modes.limit.take().is_some() {
                    applied.push(direction, 'l', None);
                }
                Ok(())
            }
            (ModeChange::MissingArg(_, 'k' | 'l'), _) => Err(HandlerError::NeedMoreParams),
            // o/v/b without an argument are ignored.
            (ModeChange::MissingArg(..), _) => Ok(()),
            (ModeChange::Unknown(_, letter), _) => Err(HandlerError::UnknownMode(letter)),
            _ => Ok(()),
        };

        if let Err(e) = result {
            errors.push(e);
        }
    }

    (applied, errors)
}

/// Set op or voice on a resolved member; yields the member's display nick.
fn apply_member_mode(
    state: &mut ChannelState,
    channel: &str,
    nick: &str,
    client: Option<Arc<Client>>,
    set: impl FnOnce(&mut ChannelState, ClientId) -> bool,
) -> Result<String, HandlerError> {
    let client = client.ok_or_else(|| HandlerError::NoSuchNick(nick.to_string()))?;
    if set(state, client.id()) {
        Ok(client.nick())
    } else {
        Err(ChannelError::UserNotInChannel {
            nick: client.nick(),
            channel: channel.to_string(),
        }
        .into())
    }
}
