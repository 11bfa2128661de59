//! A connected client session.
//!
//! A [`Client`] is shared as `Arc<Client>` between its connection task, the
//! nickname index, the session table and every channel it has joined. The
//! connection task is the only writer of identity fields apart from the
//! nickname, which the [`Matrix`](super::Matrix) updates under its index lock.
//!
//! Outbound lines go through a bounded queue drained by the connection's
//! writer task. [`Client::send`] never waits: a full queue means the peer is
//! not reading, and that peer alone gets disconnected.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tinyircd_proto::{Response, format_mask};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{Channel, ClientId};

/// User modes.
#[derive(Debug, Default, Clone)]
pub struct UserModes {
    pub invisible: bool, // +i
    pub wallops: bool,   // +w
    pub oper: bool,      // +o (IRC operator)
}

impl UserModes {
    /// Convert modes to a string like "+iw".
    pub fn as_mode_string(&self) -> String {
        let mut s = String::from("+");
        if self.invisible {
            s.push('i');
        }
        if self.wallops {
            s.push('w');
        }
        if self.oper {
            s.push('o');
        }
        s
    }
}

/// Identity and status of a client.
#[derive(Debug, Default)]
pub struct ClientState {
    pub nick: String,
    pub user: String,
    pub realname: String,
    pub host: String,
    /// Display host that replaces `host` in masks (set on OPER).
    pub vhost: Option<String>,
    pub registered: bool,
    pub modes: UserModes,
    pub away: Option<String>,
    /// Free-form line shown in WHOIS for operators.
    pub whois_note: Option<String>,
}

impl ClientState {
    /// Host shown to other users.
    pub fn display_host(&self) -> &str {
        self.vhost.as_deref().unwrap_or(&self.host)
    }

    /// `nick!user@host` using the display host.
    pub fn mask(&self) -> String {
        format_mask(&self.nick, &self.user, self.display_host())
    }

    /// The nick, or `*` before one has been accepted.
    pub fn nick_or_star(&self) -> &str {
        if self.nick.is_empty() { "*" } else { &self.nick }
    }
}

/// One connected session.
pub struct Client {
    id: ClientId,
    addr: SocketAddr,
    signon: i64,
    last_activity: AtomicI64,
    state: RwLock<ClientState>,
    /// Channels this client is in, keyed by folded name.
    channels: RwLock<HashMap<String, Arc<Channel>>>,
    outbound: mpsc::Sender<Arc<str>>,
    closed: CancellationToken,
    quit_reason: Mutex<Option<String>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("addr", &self.addr)
            .field("nick", &self.state.read().nick)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client whose outbound lines are queued on `outbound`.
    pub fn new(id: ClientId, addr: SocketAddr, outbound: mpsc::Sender<Arc<str>>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id,
            addr,
            signon: now,
            last_activity: AtomicI64::new(now),
            state: RwLock::new(ClientState {
                host: addr.ip().to_string(),
                ..ClientState::default()
            }),
            channels: RwLock::new(HashMap::new()),
            outbound,
            closed: CancellationToken::new(),
            quit_reason: Mutex::new(None),
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Unix time the connection was accepted.
    pub fn signon(&self) -> i64 {
        self.signon
    }

    pub fn state(&self) -> RwLockReadGuard<'_, ClientState> {
        self.state.read()
    }

    pub fn state_mut(&self) -> RwLockWriteGuard<'_, ClientState> {
        self.state.write()
    }

    pub fn nick(&self) -> String {
        self.state.read().nick.clone()
    }

    pub fn mask(&self) -> String {
        self.state.read().mask()
    }

    pub fn is_registered(&self) -> bool {
        self.state.read().registered
    }

    pub fn is_oper(&self) -> bool {
        self.state.read().modes.oper
    }

    /// Complete registration if both nick and user are known.
    ///
    /// Returns `true` exactly once per client: on the call that performed the
    /// transition.
    pub fn try_register(&self) -> bool {
        let mut state = self.state.write();
        if state.registered || state.nick.is_empty() || state.user.is_empty() {
            return false;
        }
        state.registered = true;
        true
    }

    /// Queue a line for delivery. Never blocks.
    ///
    /// Overflow or a dead writer closes this client; the caller is unaffected.
    pub fn send(&self, line: impl Into<Arc<str>>) {
        match self.outbound.try_send(line.into()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(client = self.id, "SendQ exceeded, disconnecting");
                self.close_with("SendQ exceeded");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(client = self.id, "Send to closed client dropped");
                self.close();
            }
        }
    }

    /// Send `:<server> <code> <nick|*> <text>`.
    pub fn send_reply(&self, server: &str, response: Response, text: &str) {
        let line = {
            let state = self.state.read();
            response.reply(server, state.nick_or_star(), text)
        };
        self.send(line);
    }

    /// Record activity for idle tracking.
    pub fn touch(&self) {
        self.last_activity
            .store(chrono::Utc::now().timestamp(), Ordering::Relaxed);
    }

    /// Seconds since the last command.
    pub fn idle_secs(&self) -> i64 {
        let last = self.last_activity.load(Ordering::Relaxed);
        (chrono::Utc::now().timestamp() - last).max(0)
    }

    // === Channel view ===

    pub(super) fn joined_channel(&self, key: &str, channel: Arc<Channel>) {
        self.channels.write().insert(key.to_string(), channel);
    }

    pub(super) fn left_channel(&self, key: &str) {
        self.channels.write().remove(key);
    }

    /// Whether this client's own view contains the channel (folded name).
    pub fn in_channel(&self, key: &str) -> bool {
        self.channels.read().contains_key(key)
    }

    /// Snapshot of joined channels.
    pub fn channels(&self) -> Vec<Arc<Channel>> {
        self.channels.read().values().cloned().collect()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }

    /// Every client sharing at least one channel with this one, once each.
    pub fn peers(&self) -> Vec<Arc<Client>> {
        let mut seen = HashMap::new();
        for channel in self.channels() {
            for (member, _) in channel.members() {
                if member.id != self.id {
                    seen.entry(member.id).or_insert(member);
                }
            }
        }
        seen.into_values().collect()
    }

    // === Lifecycle ===

    /// Ask the connection task to shut this client down.
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Close with a quit reason shown to channel peers. The first reason wins.
    pub fn close_with(&self, reason: impl Into<String>) {
        {
            let mut slot = self.quit_reason.lock();
            if slot.is_none() {
                *slot = Some(reason.into());
            }
        }
        self.close();
    }

    pub fn quit_reason(&self) -> Option<String> {
        self.quit_reason.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Token cancelled when the client is closed.
    pub fn close_token(&self) -> CancellationToken {
        self.closed.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::client_with_queue;

    #[test]
    fn test_registration_fires_once() {
        let (client, _rx) = client_with_queue(1, 8);
        assert!(!client.try_register());

        client.state_mut().user = "alice".into();
        assert!(!client.try_register());

        client.state_mut().nick = "alice".into();
        assert!(client.try_register());
        assert!(!client.try_register());
        assert!(client.is_registered());
    }

    #[test]
    fn test_send_reply_uses_star_before_nick() {
        let (client, mut rx) = client_with_queue(1, 8);
        client.send_reply("irc.test", Response::ERR_NOTREGISTERED, ":You have not registered");
        assert_eq!(
            &*rx.try_recv().unwrap(),
            ":irc.test 451 * :You have not registered"
        );

        client.state_mut().nick = "bob".into();
        client.send_reply("irc.test", Response::RPL_UNAWAY, ":back");
        assert_eq!(&*rx.try_recv().unwrap(), ":irc.test 305 bob :back");
    }

    #[test]
    fn test_sendq_overflow_closes_client() {
        let (client, _rx) = client_with_queue(1, 2);
        client.send("one");
        client.send("two");
        assert!(!client.is_closed());
        client.send("three");
        assert!(client.is_closed());
        assert_eq!(client.quit_reason().as_deref(), Some("SendQ exceeded"));
    }

    #[test]
    fn test_send_to_dropped_writer_closes() {
        let (client, rx) = client_with_queue(1, 2);
        drop(rx);
        client.send("hello");
        assert!(client.is_closed());
    }

    #[test]
    fn test_mask_prefers_vhost() {
        let (client, _rx) = client_with_queue(1, 2);
        {
            let mut state = client.state_mut();
            state.nick = "alice".into();
            state.user = "al".into();
        }
        assert_eq!(client.mask(), "alice!al@127.0.0.1");
        client.state_mut().vhost = Some("staff.example".into());
        assert_eq!(client.mask(), "alice!al@staff.example");
    }

    #[test]
    fn test_first_quit_reason_wins() {
        let (client, _rx) = client_with_queue(1, 2);
        client.close_with("Killed by oper (bye)");
        client.close_with("Connection closed");
        assert_eq!(client.quit_reason().as_deref(), Some("Killed by oper (bye)"));
    }

    #[test]
    fn test_user_mode_string() {
        let modes = UserModes {
            invisible: true,
            wallops: false,
            oper: true,
        };
        assert_eq!(modes.as_mode_string(), "+io");
        assert_eq!(UserModes::default().as_mode_string(), "+");
    }
}
