//! Channel mode string parsing.
//!
//! `parse_channel_modes("+ov-k", &["bob", "carol"])` walks the letters left to
//! right and hands out arguments in the order the letters that need one
//! appear. Applying the result is the server's job.

use std::fmt;

/// Whether a mode is being set or cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeDirection {
    /// `+`
    Add,
    /// `-`
    Remove,
}

impl ModeDirection {
    /// `'+'` or `'-'`.
    pub fn sign(self) -> char {
        match self {
            Self::Add => '+',
            Self::Remove => '-',
        }
    }
}

/// One parsed mode change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModeChange {
    /// A boolean channel flag: one of `i m n p s t`.
    Flag(ModeDirection, char),
    /// `o <nick>`
    Op(ModeDirection, String),
    /// `v <nick>`
    Voice(ModeDirection, String),
    /// `b <mask>`
    Ban(ModeDirection, String),
    /// `+k <key>`, or `-k [key]`.
    Key(ModeDirection, Option<String>),
    /// `+l <limit>` (raw, validated by the caller), or `-l`.
    Limit(ModeDirection, Option<String>),
    /// A letter that needs an argument but none was left.
    MissingArg(ModeDirection, char),
    /// A letter this server does not know.
    Unknown(ModeDirection, char),
}

impl ModeChange {
    /// Direction of the change.
    pub fn direction(&self) -> ModeDirection {
        match self {
            Self::Flag(d, _)
            | Self::Op(d, _)
            | Self::Voice(d, _)
            | Self::Ban(d, _)
            | Self::Key(d, _)
            | Self::Limit(d, _)
            | Self::MissingArg(d, _)
            | Self::Unknown(d, _) => *d,
        }
    }

    /// The mode letter.
    pub fn letter(&self) -> char {
        match self {
            Self::Flag(_, c) | Self::MissingArg(_, c) | Self::Unknown(_, c) => *c,
            Self::Op(..) => 'o',
            Self::Voice(..) => 'v',
            Self::Ban(..) => 'b',
            Self::Key(..) => 'k',
            Self::Limit(..) => 'l',
        }
    }
}

impl fmt::Display for ModeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.direction().sign(), self.letter())
    }
}

/// Parse `modes` consuming `args` left to right.
pub fn parse_channel_modes<S: AsRef<str>>(modes: &str, args: &[S]) -> Vec<ModeChange> {
    use ModeDirection::{Add, Remove};

    let mut args = args.iter().map(|a| a.as_ref().to_string());
    let mut direction = Add;
    let mut changes = Vec::new();

    for c in modes.chars() {
        let change = match c {
            '+' => {
                direction = Add;
                continue;
            }
            '-' => {
                direction = Remove;
                continue;
            }
            'i' | 'm' | 'n' | 'p' | 's' | 't' => ModeChange::Flag(direction, c),
            'o' | 'v' | 'b' => match args.next() {
                Some(arg) if c == 'o' => ModeChange::Op(direction, arg),
                Some(arg) if c == 'v' => ModeChange::Voice(direction, arg),
                Some(arg) => ModeChange::Ban(direction, arg),
                None => ModeChange::MissingArg(direction, c),
            },
            'k' | 'l' if direction == Add => match args.next() {
                Some(arg) if c == 'k' => ModeChange::Key(Add, Some(arg)),
                Some(arg) => ModeChange::Limit(Add, Some(arg)),
                None => ModeChange::MissingArg(Add, c),
            },
            'k' => ModeChange::Key(Remove, args.next()),
            'l' => ModeChange::Limit(Remove, None),
            _ => ModeChange::Unknown(direction, c),
        };
        changes.push(change);
    }

    changes
}
