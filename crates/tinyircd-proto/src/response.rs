//! Numeric replies used by the server (RFC 1459 / RFC 2812 numbering).

#![allow(non_camel_case_types)]

use std::fmt;

/// Server numeric reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Response {
    // === Registration ===
    /// 001
    RPL_WELCOME = 1,
    /// 002
    RPL_YOURHOST = 2,
    /// 003
    RPL_CREATED = 3,
    /// 004
    RPL_MYINFO = 4,

    // === Command replies ===
    /// 221 - user mode string
    RPL_UMODEIS = 221,
    /// 301 - target is away
    RPL_AWAY = 301,
    /// 302 - USERHOST reply
    RPL_USERHOST = 302,
    /// 305 - no longer away
    RPL_UNAWAY = 305,
    /// 306 - marked away
    RPL_NOWAWAY = 306,
    /// 311
    RPL_WHOISUSER = 311,
    /// 312
    RPL_WHOISSERVER = 312,
    /// 313
    RPL_WHOISOPERATOR = 313,
    /// 315
    RPL_ENDOFWHO = 315,
    /// 317
    RPL_WHOISIDLE = 317,
    /// 318
    RPL_ENDOFWHOIS = 318,
    /// 319
    RPL_WHOISCHANNELS = 319,
    /// 320 - free-form WHOIS line
    RPL_WHOISSPECIAL = 320,
    /// 321
    RPL_LISTSTART = 321,
    /// 322
    RPL_LIST = 322,
    /// 323
    RPL_LISTEND = 323,
    /// 324
    RPL_CHANNELMODEIS = 324,
    /// 329
    RPL_CREATIONTIME = 329,
    /// 331
    RPL_NOTOPIC = 331,
    /// 332
    RPL_TOPIC = 332,
    /// 333
    RPL_TOPICWHOTIME = 333,
    /// 341
    RPL_INVITING = 341,
    /// 352
    RPL_WHOREPLY = 352,
    /// 353
    RPL_NAMREPLY = 353,
    /// 366
    RPL_ENDOFNAMES = 366,
    /// 367
    RPL_BANLIST = 367,
    /// 368
    RPL_ENDOFBANLIST = 368,
    /// 372
    RPL_MOTD = 372,
    /// 375
    RPL_MOTDSTART = 375,
    /// 376
    RPL_ENDOFMOTD = 376,
    /// 381
    RPL_YOUREOPER = 381,

    // === Errors ===
    /// 401
    ERR_NOSUCHNICK = 401,
    /// 403
    ERR_NOSUCHCHANNEL = 403,
    /// 404
    ERR_CANNOTSENDTOCHAN = 404,
    /// 405
    ERR_TOOMANYCHANNELS = 405,
    /// 409
    ERR_NOORIGIN = 409,
    /// 411
    ERR_NORECIPIENT = 411,
    /// 412
    ERR_NOTEXTTOSEND = 412,
    /// 421
    ERR_UNKNOWNCOMMAND = 421,
    /// 431
    ERR_NONICKNAMEGIVEN = 431,
    /// 432
    ERR_ERRONEUSNICKNAME = 432,
    /// 433
    ERR_NICKNAMEINUSE = 433,
    /// 441
    ERR_USERNOTINCHANNEL = 441,
    /// 442
    ERR_NOTONCHANNEL = 442,
    /// 443
    ERR_USERONCHANNEL = 443,
    /// 451
    ERR_NOTREGISTERED = 451,
    /// 461
    ERR_NEEDMOREPARAMS = 461,
    /// 462
    ERR_ALREADYREGISTRED = 462,
    /// 464
    ERR_PASSWDMISMATCH = 464,
    /// 467
    ERR_KEYSET = 467,
    /// 471
    ERR_CHANNELISFULL = 471,
    /// 472
    ERR_UNKNOWNMODE = 472,
    /// 473
    ERR_INVITEONLYCHAN = 473,
    /// 474
    ERR_BANNEDFROMCHAN = 474,
    /// 475
    ERR_BADCHANNELKEY = 475,
    /// 476
    ERR_BADCHANMASK = 476,
    /// 481
    ERR_NOPRIVILEGES = 481,
    /// 482
    ERR_CHANOPRIVSNEEDED = 482,
    /// 491
    ERR_NOOPERHOST = 491,
    /// 501
    ERR_UMODEUNKNOWNFLAG = 501,
    /// 502
    ERR_USERSDONTMATCH = 502,
}

impl Response {
    /// Numeric value.
    #[inline]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Whether this numeric is an error (400-599).
    #[inline]
    pub const fn is_error(self) -> bool {
        self.code() >= 400
    }

    /// Format `:<server> <code> <target> <text>` (no terminator).
    ///
    /// `text` is written as-is, so callers place the trailing `:` themselves.
    pub fn reply(self, server: &str, target: &str, text: &str) -> String {
        format!(":{server} {self} {target} {text}")
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}
