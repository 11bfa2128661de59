//! The Matrix - Central shared state for the IRC server.
//!
//! The Matrix holds the nickname index, the channel index, the table of live
//! sessions and the shutdown coordinator. It is shared as `Arc<Matrix>` by the
//! gateway, every connection task and every handler.
//!
//! Nicknames and channel names are keyed by their RFC 1459 folded form; the
//! display form is whatever the holder or creator typed.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use tinyircd_proto::irc_to_lower;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ChannelError, HandlerError};
use crate::state::dashmap_ext::DashMapExt;
use crate::state::{Channel, ChannelModes, Client, ClientId, ClientIdGenerator, MemberModes};

/// This server's identity information.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub network: String,
    pub description: String,
    pub version: String,
    pub created: DateTime<Utc>,
}

/// A pending request to stop (or restart) the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownRequest {
    pub reason: Option<String>,
    pub restart: bool,
}

impl ShutdownRequest {
    pub fn shutdown(reason: Option<String>) -> Self {
        Self {
            reason,
            restart: false,
        }
    }

    pub fn restart(reason: Option<String>) -> Self {
        Self {
            reason,
            restart: true,
        }
    }

    /// Text of the notice sent to every session.
    pub fn notice(&self) -> String {
        let verb = if self.restart {
            "Server is restarting"
        } else {
            "Server is shutting down"
        };
        match &self.reason {
            Some(reason) if !reason.is_empty() => format!("{verb}: {reason}"),
            _ => verb.to_string(),
        }
    }
}

/// Result of a successful JOIN.
#[derive(Debug)]
pub struct JoinOutcome {
    pub channel: Arc<Channel>,
    /// The joiner created the channel and is its founding operator.
    pub created: bool,
}

/// The Matrix - Central shared state container.
pub struct Matrix {
    /// This server's identity.
    pub server_info: ServerInfo,

    /// Loaded configuration.
    pub config: Config,

    /// Folded nick -> client. Only clients with an accepted nick appear here.
    nicks: RwLock<HashMap<String, Arc<Client>>>,

    /// Folded channel name -> channel.
    channels: DashMap<String, Arc<Channel>>,

    /// Every live connection, registered or not.
    sessions: DashMap<ClientId, Arc<Client>>,

    ids: ClientIdGenerator,

    /// Cancelled when shutdown starts; stops the accept loop.
    shutdown: CancellationToken,
    shutting_down: AtomicBool,
    shutdown_requests: watch::Sender<Option<ShutdownRequest>>,

    /// Tracks in-flight connection tasks.
    tracker: TaskTracker,
}

impl Matrix {
    /// Create a new Matrix with the given server configuration.
    pub fn new(config: Config) -> Self {
        let server_info = ServerInfo {
            name: config.server.name.clone(),
            network: config.server.network.clone(),
            description: config.server.description.clone(),
            version: config.server.version.clone(),
            created: Utc::now(),
        };
        let (shutdown_requests, _) = watch::channel(None);

        Self {
            server_info,
            config,
            nicks: RwLock::new(HashMap::new()),
            channels: DashMap::new(),
            sessions: DashMap::new(),
            ids: ClientIdGenerator::new(),
            shutdown: CancellationToken::new(),
            shutting_down: AtomicBool::new(false),
            shutdown_requests,
            tracker: TaskTracker::new(),
        }
    }

    /// Server name used as the prefix of server-originated lines.
    pub fn server_name(&self) -> &str {
        &self.server_info.name
    }

    pub fn next_client_id(&self) -> ClientId {
        self.ids.next()
    }

    // === Sessions ===

    /// Track a new connection.
    ///
    /// Returns `false` if shutdown has already begun; the caller must close it.
    pub fn register_session(&self, client: Arc<Client>) -> bool {
        self.sessions.insert(client.id(), client);
        !self.shutting_down.load(Ordering::SeqCst)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Remove a session from every channel, the nickname index and the
    /// session table. Called once, from the session's own cleanup path.
    pub fn remove_session(&self, client: &Client) {
        for channel in client.channels() {
            self.leave_channel(&channel, client);
        }

        let nick = client.nick();
        if !nick.is_empty() {
            let folded = irc_to_lower(&nick);
            let mut nicks = self.nicks.write();
            if nicks.get(&folded).is_some_and(|holder| holder.id() == client.id()) {
                nicks.remove(&folded);
            }
        }

        self.sessions.remove(&client.id());
        debug!(client = client.id(), nick = %nick, "Session removed");
    }

    /// Tell channel peers that `client` quit, then remove it everywhere.
    ///
    /// The nick is free before any peer sees the QUIT.
    pub fn disconnect(&self, client: &Client, reason: &str) {
        let peers = if client.is_registered() {
            client.peers()
        } else {
            Vec::new()
        };
        let line: Arc<str> = format!(":{} QUIT :{}", client.mask(), reason).into();

        self.remove_session(client);

        for peer in peers {
            peer.send(line.clone());
        }
    }

    // === Nicknames ===

    /// Claim `nick` for `client`, releasing its previous nick.
    ///
    /// Check and swap happen under one write lock. On success the client's
    /// nick field is updated and the previous nick (if any) is returned.
    pub fn register_nick(
        &self,
        client: &Arc<Client>,
        nick: &str,
    ) -> Result<Option<String>, HandlerError> {
        let folded = irc_to_lower(nick);
        let mut nicks = self.nicks.write();

        if nicks
            .get(&folded)
            .is_some_and(|holder| holder.id() != client.id())
        {
            return Err(HandlerError::NicknameInUse(nick.to_string()));
        }

        let old = std::mem::replace(&mut client.state_mut().nick, nick.to_string());
        if !old.is_empty() {
            let old_folded = irc_to_lower(&old);
            if old_folded != folded {
                nicks.remove(&old_folded);
            }
        }
        nicks.insert(folded, client.clone());

        Ok((!old.is_empty()).then_some(old))
    }

    /// Find a client by nick (case-insensitive).
    pub fn lookup_client(&self, nick: &str) -> Option<Arc<Client>> {
        self.nicks.read().get(&irc_to_lower(nick)).cloned()
    }

    /// Snapshot of every client holding a nick.
    pub fn clients(&self) -> Vec<Arc<Client>> {
        self.nicks.read().values().cloned().collect()
    }

    // === Channels ===

    /// Find a channel by name (case-insensitive).
    pub fn lookup_channel(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels.get_cloned(&irc_to_lower(name))
    }

    /// Snapshot of every channel.
    pub fn list_channels(&self) -> Vec<Arc<Channel>> {
        let mut channels = self.channels.values_cloned();
        channels.sort_by(|a, b| a.key().cmp(b.key()));
        channels
    }

    fn new_channel(&self, name: &str) -> Channel {
        Channel::new(
            name,
            ChannelModes::from_defaults(&self.config.channels.default_modes),
        )
    }

    /// Join `client` to `name`, creating the channel if needed.
    ///
    /// Runs under the index entry guard, so two racing creators cannot both
    /// become founding operator and a channel being reclaimed cannot gain a
    /// member. Checks on an existing channel run in order: invite-only, ban,
    /// key, limit.
    pub fn join_channel(
        &self,
        client: &Arc<Client>,
        name: &str,
        key: Option<&str>,
    ) -> Result<JoinOutcome, ChannelError> {
        let (mask, nick) = {
            let state = client.state();
            (state.mask(), state.nick.clone())
        };
        let max_users = self.config.limits.max_users_per_channel;

        match self.channels.entry(irc_to_lower(name)) {
            Entry::Occupied(entry) => {
                let channel = entry.get().clone();
                {
                    let mut state = channel.write();
                    let display = channel.name().to_string();

                    if state.modes.invite_only && !state.is_invited(&nick) {
                        return Err(ChannelError::InviteOnlyChan(display));
                    }
                    if state.is_banned(&mask) {
                        return Err(ChannelError::BannedFromChan(display));
                    }
                    if let Some(required) = &state.modes.key
                        && key != Some(required.as_str())
                    {
                        return Err(ChannelError::BadChannelKey(display));
                    }
                    let count = state.member_count();
                    if state.modes.limit.is_some_and(|l| count >= l as usize) || count >= max_users
                    {
                        return Err(ChannelError::ChannelIsFull(display));
                    }

                    state.consume_invite(&nick);
                    Channel::add_member_locked(&channel, &mut state, client, MemberModes::default());
                }
                Ok(JoinOutcome {
                    channel,
                    created: false,
                })
            }
            Entry::Vacant(entry) => {
                let channel = Arc::new(self.new_channel(name));
                channel.add_member(
                    client,
                    MemberModes {
                        op: true,
                        voice: false,
                    },
                );
                entry.insert(channel.clone());
                info!(channel = %name, creator = %nick, "Channel created");
                Ok(JoinOutcome {
                    channel,
                    created: true,
                })
            }
        }
    }

    /// Remove `client` from `channel`, dropping the channel from the index
    /// when its last member leaves.
    ///
    /// Removal and the emptiness check happen under the index entry guard, the
    /// same guard [`join_channel`](Self::join_channel) holds, so a JOIN never
    /// lands on a memberless channel. Lock order is shard, then channel.
    pub fn leave_channel(&self, channel: &Channel, client: &Client) -> bool {
        match self.channels.entry(channel.key().to_string()) {
            Entry::Occupied(entry) if std::ptr::eq(&**entry.get(), channel) => {
                let (removed, empty) = {
                    let mut state = channel.write();
                    let removed = channel.remove_member_locked(&mut state, client);
                    (removed, state.member_count() == 0)
                };
                if empty {
                    entry.remove();
                    debug!(channel = %channel.name(), "Channel reclaimed");
                }
                removed
            }
            // Already reclaimed; only this membership is left to undo.
            _ => channel.remove_member(client),
        }
    }

    // === Shutdown ===

    /// Token cancelled once shutdown begins.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Ask the process root to shut down. Only the first request counts.
    pub fn request_shutdown(&self, request: ShutdownRequest) -> bool {
        self.shutdown_requests.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(request);
                true
            } else {
                false
            }
        })
    }

    /// Wait until some handler calls [`request_shutdown`](Self::request_shutdown).
    pub async fn shutdown_requested(&self) -> ShutdownRequest {
        let mut rx = self.shutdown_requests.subscribe();
        match rx.wait_for(Option::is_some).await {
            Ok(request) => Option::clone(&request).unwrap_or_default(),
            Err(_) => ShutdownRequest::default(),
        }
    }

    /// Graceful shutdown. Single-fire: later or concurrent calls return at once.
    ///
    /// Stops the accept loop, sends `notice` to every session once, closes
    /// every session, then waits for all connection tasks to finish cleanup.
    pub async fn shutdown(&self, notice: &str) {
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(reason = %notice, sessions = self.session_count(), "Server shutting down");

        self.shutdown.cancel();

        let line: Arc<str> = format!(":{} NOTICE * :{}", self.server_info.name, notice).into();
        for client in self.sessions.values_cloned() {
            client.send(line.clone());
            client.close_with("Server shutting down");
        }

        self.tracker.close();
        self.tracker.wait().await;
        info!("Server shutdown complete");
    }
}
