//! Unified error handling for tinyircd.
//!
//! Handler failures are user errors: each maps to exactly one numeric reply
//! sent back to the requesting client, and none of them closes the connection.
//! The only exception is [`HandlerError::Quit`], which the connection loop
//! turns into a disconnect.

use thiserror::Error;
use tinyircd_proto::Response;

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams,

    /// Parameter present but unusable; the text becomes the 461 trailer.
    #[error("invalid parameter: {0}")]
    InvalidParam(&'static str),

    #[error("not registered")]
    NotRegistered,

    #[error("permission denied")]
    NoPrivileges,

    #[error("no such nick: {0}")]
    NoSuchNick(String),

    #[error("no such channel: {0}")]
    NoSuchChannel(String),

    #[error("nickname in use: {0}")]
    NicknameInUse(String),

    #[error("erroneous nickname: {0}")]
    ErroneousNickname(String),

    #[error("no nickname given")]
    NoNicknameGiven,

    #[error("already registered")]
    AlreadyRegistered,

    #[error("no origin")]
    NoOrigin,

    #[error("no recipient")]
    NoRecipient,

    #[error("no text to send")]
    NoTextToSend,

    #[error("password incorrect")]
    PasswordMismatch,

    #[error("no oper block for host")]
    NoOperHost,

    #[error("cannot change mode for other users")]
    UsersDontMatch,

    #[error("unknown user mode flag")]
    UnknownUserMode,

    #[error("unknown channel mode {0}")]
    UnknownMode(char),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("client quit: {0:?}")]
    Quit(Option<String>),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Static label for log fields.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NeedMoreParams => "need_more_params",
            Self::InvalidParam(_) => "invalid_param",
            Self::NotRegistered => "not_registered",
            Self::NoPrivileges => "no_privileges",
            Self::NoSuchNick(_) => "no_such_nick",
            Self::NoSuchChannel(_) => "no_such_channel",
            Self::NicknameInUse(_) => "nickname_in_use",
            Self::ErroneousNickname(_) => "erroneous_nickname",
            Self::NoNicknameGiven => "no_nickname_given",
            Self::AlreadyRegistered => "already_registered",
            Self::NoOrigin => "no_origin",
            Self::NoRecipient => "no_recipient",
            Self::NoTextToSend => "no_text_to_send",
            Self::PasswordMismatch => "password_mismatch",
            Self::NoOperHost => "no_oper_host",
            Self::UsersDontMatch => "users_dont_match",
            Self::UnknownUserMode => "unknown_user_mode",
            Self::UnknownMode(_) => "unknown_mode",
            Self::Channel(e) => e.error_code(),
            Self::Quit(_) => "quit",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Render the numeric reply line for this error.
    ///
    /// Returns `None` for errors that don't warrant a client-visible reply.
    pub fn to_reply(&self, server_name: &str, nick: &str, cmd_name: &str) -> Option<String> {
        let (response, text) = match self {
            Self::NeedMoreParams => (
                Response::ERR_NEEDMOREPARAMS,
                format!("{cmd_name} :Not enough parameters"),
            ),
            Self::InvalidParam(reason) => {
                (Response::ERR_NEEDMOREPARAMS, format!("{cmd_name} :{reason}"))
            }
            Self::NotRegistered => (
                Response::ERR_NOTREGISTERED,
                ":You have not registered".to_string(),
            ),
            Self::NoPrivileges => (
                Response::ERR_NOPRIVILEGES,
                ":Permission Denied- You're not an IRC operator".to_string(),
            ),
            Self::NoSuchNick(target) => (
                Response::ERR_NOSUCHNICK,
                format!("{target} :No such nick/channel"),
            ),
            Self::NoSuchChannel(chan) => (
                Response::ERR_NOSUCHCHANNEL,
                format!("{chan} :No such channel"),
            ),
            Self::NicknameInUse(bad) => (
                Response::ERR_NICKNAMEINUSE,
                format!("{bad} :Nickname is already in use"),
            ),
            Self::ErroneousNickname(bad) => (
                Response::ERR_ERRONEUSNICKNAME,
                format!("{bad} :Erroneous nickname"),
            ),
            Self::NoNicknameGiven => (
                Response::ERR_NONICKNAMEGIVEN,
                ":No nickname given".to_string(),
            ),
            Self::AlreadyRegistered => (
                Response::ERR_ALREADYREGISTRED,
                ":You may not reregister".to_string(),
            ),
            Self::NoOrigin => (Response::ERR_NOORIGIN, ":No origin specified".to_string()),
            Self::NoRecipient => (
                Response::ERR_NORECIPIENT,
                format!(":No recipient given ({cmd_name})"),
            ),
            Self::NoTextToSend => (Response::ERR_NOTEXTTOSEND, ":No text to send".to_string()),
            Self::PasswordMismatch => (
                Response::ERR_PASSWDMISMATCH,
                ":Password incorrect".to_string(),
            ),
            Self::NoOperHost => (
                Response::ERR_NOOPERHOST,
                ":No O-lines for your host".to_string(),
            ),
            Self::UsersDontMatch => (
                Response::ERR_USERSDONTMATCH,
                ":Cannot change mode for other users".to_string(),
            ),
            Self::UnknownUserMode => (
                Response::ERR_UMODEUNKNOWNFLAG,
                ":Unknown MODE flag".to_string(),
            ),
            Self::UnknownMode(c) => (
                Response::ERR_UNKNOWNMODE,
                format!("{c} :is unknown mode char to me"),
            ),
            Self::Channel(e) => return Some(e.to_reply(server_name, nick)),

            // These errors don't get client-visible replies
            Self::Quit(_) | Self::Internal(_) => return None,
        };

        Some(response.reply(server_name, nick, &text))
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Channel Errors
// ============================================================================

/// Channel operation errors. Each carries the channel name it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("not on channel {0}")]
    NotOnChannel(String),

    #[error("not channel operator on {0}")]
    ChanOpPrivsNeeded(String),

    #[error("user {nick} is not on {channel}")]
    UserNotInChannel { nick: String, channel: String },

    #[error("user {nick} is not an operator on {channel}")]
    NotChannelOperator { nick: String, channel: String },

    #[error("user {nick} is already on {channel}")]
    UserOnChannel { nick: String, channel: String },

    #[error("cannot join {0} (+b)")]
    BannedFromChan(String),

    #[error("cannot join {0} (+i)")]
    InviteOnlyChan(String),

    #[error("cannot join {0} (+l)")]
    ChannelIsFull(String),

    #[error("cannot join {0} (+k)")]
    BadChannelKey(String),

    #[error("bad channel mask {0}")]
    BadChanMask(String),

    #[error("too many channels, refused {0}")]
    TooManyChannels(String),

    #[error("cannot send to {0}")]
    CannotSendToChan(String),

    #[error("cannot send to {0} (+m)")]
    CannotSendModerated(String),

    #[error("key already set on {0}")]
    KeySet(String),
}

impl ChannelError {
    /// Static label for log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotOnChannel(_) => "not_on_channel",
            Self::ChanOpPrivsNeeded(_) => "chanop_privs_needed",
            Self::UserNotInChannel { .. } => "user_not_in_channel",
            Self::NotChannelOperator { .. } => "not_channel_operator",
            Self::UserOnChannel { .. } => "user_on_channel",
            Self::BannedFromChan(_) => "banned_from_chan",
            Self::InviteOnlyChan(_) => "invite_only_chan",
            Self::ChannelIsFull(_) => "channel_is_full",
            Self::BadChannelKey(_) => "bad_channel_key",
            Self::BadChanMask(_) => "bad_chan_mask",
            Self::TooManyChannels(_) => "too_many_channels",
            Self::CannotSendToChan(_) => "cannot_send_to_chan",
            Self::CannotSendModerated(_) => "cannot_send_moderated",
            Self::KeySet(_) => "key_set",
        }
    }

    /// Render the numeric reply line for this error.
    pub fn to_reply(&self, server_name: &str, nick: &str) -> String {
        let (response, text) = match self {
            Self::NotOnChannel(chan) => (
                Response::ERR_NOTONCHANNEL,
                format!("{chan} :You're not on that channel"),
            ),
            Self::ChanOpPrivsNeeded(chan) => (
                Response::ERR_CHANOPRIVSNEEDED,
                format!("{chan} :You're not channel operator"),
            ),
            Self::UserNotInChannel { nick: target, channel } => (
                Response::ERR_USERNOTINCHANNEL,
                format!("{target} {channel} :They aren't on that channel"),
            ),
            Self::NotChannelOperator { nick: target, channel } => (
                Response::ERR_USERNOTINCHANNEL,
                format!("{target} {channel} :They aren't a channel operator"),
            ),
            Self::UserOnChannel { nick: target, channel } => (
                Response::ERR_USERONCHANNEL,
                format!("{target} {channel} :is already on channel"),
            ),
            Self::BannedFromChan(chan) => (
                Response::ERR_BANNEDFROMCHAN,
                format!("{chan} :Cannot join channel (+b)"),
            ),
            Self::InviteOnlyChan(chan) => (
                Response::ERR_INVITEONLYCHAN,
                format!("{chan} :Cannot join channel (+i)"),
            ),
            Self::ChannelIsFull(chan) => (
                Response::ERR_CHANNELISFULL,
                format!("{chan} :Cannot join channel (+l)"),
            ),
            Self::BadChannelKey(chan) => (
                Response::ERR_BADCHANNELKEY,
                format!("{chan} :Cannot join channel (+k)"),
            ),
            Self::BadChanMask(chan) => (
                Response::ERR_BADCHANMASK,
                format!("{chan} :Bad Channel Mask"),
            ),
            Self::TooManyChannels(chan) => (
                Response::ERR_TOOMANYCHANNELS,
                format!("{chan} :You have joined too many channels"),
            ),
            Self::CannotSendToChan(chan) => (
                Response::ERR_CANNOTSENDTOCHAN,
                format!("{chan} :Cannot send to channel"),
            ),
            Self::CannotSendModerated(chan) => (
                Response::ERR_CANNOTSENDTOCHAN,
                format!("{chan} :Cannot send to channel (+m)"),
            ),
            Self::KeySet(chan) => (
                Response::ERR_KEYSET,
                format!("{chan} :Channel key already set"),
            ),
        };

        response.reply(server_name, nick, &text)
    }
}
