//! IRC channel state.
//!
//! Each [`Channel`] guards its own membership, modes, bans and topic with one
//! lock. Member removal drops the op and voice bits together with the
//! membership entry and updates the departing client's channel view while the
//! channel lock is still held, so no broadcast can observe a half-removed
//! member.
//!
//! Broadcasts copy the member list under a read lock and send after
//! releasing it; sends are non-blocking queue pushes.
//!
//! Lock order: channel lock, then a member's channel-view lock. Nothing
//! holds two channel locks at once.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tinyircd_proto::{ModeChange, ModeDirection, irc_to_lower, parse_channel_modes};

use super::{Client, ClientId};

/// Channel modes.
#[derive(Debug, Default, Clone)]
pub struct ChannelModes {
    pub invite_only: bool, // +i
    pub moderated: bool,   // +m
    pub no_external: bool, // +n
    pub private: bool,     // +p
    pub secret: bool,      // +s
    pub topic_lock: bool,  // +t
    pub key: Option<String>, // +k
    pub limit: Option<u32>,  // +l
}

impl ChannelModes {
    /// Convert modes to a string like "+nt".
    pub fn as_mode_string(&self) -> String {
        let mut s = String::from("+");
        if self.invite_only {
            s.push('i');
        }
        if self.moderated {
            s.push('m');
        }
        if self.no_external {
            s.push('n');
        }
        if self.private {
            s.push('p');
        }
        if self.secret {
            s.push('s');
        }
        if self.topic_lock {
            s.push('t');
        }
        if self.key.is_some() {
            s.push('k');
        }
        if self.limit.is_some() {
            s.push('l');
        }
        s
    }

    /// Mode string plus key and limit parameters, as shown in RPL_CHANNELMODEIS.
    pub fn as_mode_string_with_params(&self) -> String {
        let mut out = self.as_mode_string();
        if let Some(key) = &self.key {
            out.push(' ');
            out.push_str(key);
        }
        if let Some(limit) = self.limit {
            out.push(' ');
            out.push_str(&limit.to_string());
        }
        out
    }

    /// Set or clear a boolean flag. Returns `false` for letters that aren't flags.
    pub fn set_flag(&mut self, letter: char, on: bool) -> bool {
        let flag = match letter {
            'i' => &mut self.invite_only,
            'm' => &mut self.moderated,
            'n' => &mut self.no_external,
            'p' => &mut self.private,
            's' => &mut self.secret,
            't' => &mut self.topic_lock,
            _ => return false,
        };
        *flag = on;
        true
    }

    /// Read a boolean flag.
    pub fn flag(&self, letter: char) -> bool {
        match letter {
            'i' => self.invite_only,
            'm' => self.moderated,
            'n' => self.no_external,
            'p' => self.private,
            's' => self.secret,
            't' => self.topic_lock,
            _ => false,
        }
    }

    /// Modes from a config string such as "+nt". Non-flag letters are ignored.
    pub fn from_defaults(modes: &str) -> Self {
        let mut out = Self::default();
        for change in parse_channel_modes(modes, &[] as &[&str]) {
            if let ModeChange::Flag(dir, letter) = change {
                out.set_flag(letter, dir == ModeDirection::Add);
            }
        }
        out
    }
}

/// An entry in the ban list.
#[derive(Debug, Clone)]
pub struct ListEntry {
    pub mask: String,
    pub set_by: String,
    pub set_at: i64,
}

/// Channel topic with metadata.
#[derive(Debug, Clone)]
pub struct Topic {
    pub text: String,
    pub set_by: String,
    pub set_at: i64,
}

/// Member modes (op, voice).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemberModes {
    pub op: bool,    // +o
    pub voice: bool, // +v
}

impl MemberModes {
    /// Get the highest prefix character for this member.
    pub fn prefix_char(&self) -> Option<char> {
        if self.op {
            Some('@')
        } else if self.voice {
            Some('+')
        } else {
            None
        }
    }
}

#[derive(Debug)]
struct Member {
    client: Arc<Client>,
    modes: MemberModes,
}

/// Everything guarded by a channel's lock.
#[derive(Debug, Default)]
pub struct ChannelState {
    pub topic: Option<Topic>,
    pub modes: ChannelModes,
    /// Keyed by client id, which orders members by connection time.
    members: BTreeMap<ClientId, Member>,
    bans: Vec<ListEntry>,
    /// Folded nicks allowed past +i.
    invites: HashSet<String>,
}

impl ChannelState {
    pub fn is_member(&self, id: ClientId) -> bool {
        self.members.contains_key(&id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn member_modes(&self, id: ClientId) -> Option<MemberModes> {
        self.members.get(&id).map(|m| m.modes)
    }

    pub fn is_op(&self, id: ClientId) -> bool {
        self.members.get(&id).is_some_and(|m| m.modes.op)
    }

    /// Op or voice.
    pub fn can_speak(&self, id: ClientId) -> bool {
        self.members
            .get(&id)
            .is_some_and(|m| m.modes.op || m.modes.voice)
    }

    /// Grant or revoke op. Returns `false` if `id` is not a member.
    pub fn set_op(&mut self, id: ClientId, on: bool) -> bool {
        match self.members.get_mut(&id) {
            Some(member) => {
                member.modes.op = on;
                true
            }
            None => false,
        }
    }

    /// Grant or revoke voice. Returns `false` if `id` is not a member.
    pub fn set_voice(&mut self, id: ClientId, on: bool) -> bool {
        match self.members.get_mut(&id) {
            Some(member) => {
                member.modes.voice = on;
                true
            }
            None => false,
        }
    }

    /// Set the topic, stamping setter and time.
    pub fn set_topic(&mut self, text: String, set_by: String) {
        self.topic = Some(Topic {
            text,
            set_by,
            set_at: chrono::Utc::now().timestamp(),
        });
    }

    // === Bans ===

    pub fn bans(&self) -> &[ListEntry] {
        &self.bans
    }

    /// Add a ban. Returns `false` if an equal mask is already listed.
    pub fn add_ban(&mut self, mask: &str, set_by: &str) -> bool {
        if self.bans.iter().any(|b| b.mask.eq_ignore_ascii_case(mask)) {
            return false;
        }
        self.bans.push(ListEntry {
            mask: mask.to_string(),
            set_by: set_by.to_string(),
            set_at: chrono::Utc::now().timestamp(),
        });
        true
    }

    /// Remove a ban. Returns `false` if it was not listed.
    pub fn remove_ban(&mut self, mask: &str) -> bool {
        let before = self.bans.len();
        self.bans.retain(|b| !b.mask.eq_ignore_ascii_case(mask));
        self.bans.len() != before
    }

    /// Whether `mask` (`nick!user@host`) matches any active ban.
    pub fn is_banned(&self, mask: &str) -> bool {
        self.bans
            .iter()
            .any(|ban| tinyircd_proto::matches_user_mask(mask, &ban.mask))
    }

    // === Invites ===

    pub fn invite(&mut self, nick: &str) {
        self.invites.insert(irc_to_lower(nick));
    }

    pub fn is_invited(&self, nick: &str) -> bool {
        self.invites.contains(&irc_to_lower(nick))
    }

    /// Remove a pending invite, if any.
    pub fn consume_invite(&mut self, nick: &str) {
        self.invites.remove(&irc_to_lower(nick));
    }
}

/// An IRC channel.
pub struct Channel {
    name: String,
    key: String,
    created: i64,
    state: RwLock<ChannelState>,
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("created", &self.created)
            .finish_non_exhaustive()
    }
}

impl Channel {
    /// Create an empty channel with the given modes.
    pub fn new(name: &str, modes: ChannelModes) -> Self {
        Self {
            name: name.to_string(),
            key: irc_to_lower(name),
            created: chrono::Utc::now().timestamp(),
            state: RwLock::new(ChannelState {
                modes,
                ..ChannelState::default()
            }),
        }
    }

    /// Display name, as given by the creator.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Folded name used as the index key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn created(&self) -> i64 {
        self.created
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ChannelState> {
        self.state.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ChannelState> {
        self.state.write()
    }

    /// Add `client` as a member. Returns `false` if it already was one.
    pub fn add_member(self: &Arc<Self>, client: &Arc<Client>, modes: MemberModes) -> bool {
        let mut state = self.state.write();
        Self::add_member_locked(self, &mut state, client, modes)
    }

    /// [`add_member`](Self::add_member) for a caller already holding the write lock.
    pub fn add_member_locked(
        self: &Arc<Self>,
        state: &mut ChannelState,
        client: &Arc<Client>,
        modes: MemberModes,
    ) -> bool {
        if state.members.contains_key(&client.id()) {
            return false;
        }
        state.members.insert(
            client.id(),
            Member {
                client: client.clone(),
                modes,
            },
        );
        client.joined_channel(&self.key, self.clone());
        true
    }

    /// Remove `client` from membership, op, voice and its own channel view.
    ///
    /// Returns `false` if it was not a member.
    pub fn remove_member(&self, client: &Client) -> bool {
        let mut state = self.state.write();
        self.remove_member_locked(&mut state, client)
    }

    /// [`remove_member`](Self::remove_member) for a caller already holding the write lock.
    pub fn remove_member_locked(&self, state: &mut ChannelState, client: &Client) -> bool {
        let removed = state.members.remove(&client.id()).is_some();
        client.left_channel(&self.key);
        removed
    }

    /// Point-in-time member list.
    pub fn members(&self) -> Vec<(Arc<Client>, MemberModes)> {
        self.state
            .read()
            .members
            .values()
            .map(|m| (m.client.clone(), m.modes))
            .collect()
    }

    /// Send `line` to every member.
    pub fn broadcast(&self, line: impl Into<Arc<str>>) {
        self.broadcast_filtered(line.into(), None);
    }

    /// Send `line` to every member except `sender`.
    pub fn broadcast_except(&self, sender: ClientId, line: impl Into<Arc<str>>) {
        self.broadcast_filtered(line.into(), Some(sender));
    }

    fn broadcast_filtered(&self, line: Arc<str>, exclude: Option<ClientId>) {
        let targets: Vec<Arc<Client>> = {
            let state = self.state.read();
            state
                .members
                .iter()
                .filter(|(id, _)| Some(**id) != exclude)
                .map(|(_, m)| m.client.clone())
                .collect()
        };
        for client in targets {
            client.send(line.clone());
        }
    }

    /// NAMES entries: `@nick`, `+nick` or `nick` per member.
    pub fn names(&self) -> Vec<String> {
        self.members()
            .into_iter()
            .map(|(client, modes)| {
                let nick = client.nick();
                match modes.prefix_char() {
                    Some(p) => format!("{p}{nick}"),
                    None => nick,
                }
            })
            .collect()
    }
}

/// Whether `mask` can be stored as a ban.
pub fn is_valid_ban_mask(mask: &str) -> bool {
    !mask.is_empty() && tinyircd_proto::validate_mask(mask)
}
