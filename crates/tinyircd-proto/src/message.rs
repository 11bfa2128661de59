//! Protocol message grammar.
//!
//! A line is `[":" prefix SP] command [SP params]`. The last parameter may
//! start with `:` and then runs to the end of the line, spaces included.
//! Empty middle parameters cannot be represented on the wire.

use std::fmt;
use std::str::FromStr;

use crate::error::{ProtocolError, Result};

/// A decoded protocol line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Source prefix without the leading `:`.
    pub prefix: Option<String>,
    /// Upper-cased command verb or three-digit numeric.
    pub command: String,
    /// Parameters in order; the trailing parameter is stored without its `:`.
    pub params: Vec<String>,
}

impl Message {
    /// Build a message with no prefix.
    pub fn new(command: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            prefix: None,
            command: command.into(),
            params,
        }
    }

    /// Attach a source prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Parse one line. Surrounding CR/LF characters are ignored.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_matches(|c| c == '\r' || c == '\n');
        let mut rest = line.trim_start_matches(' ');
        if rest.is_empty() {
            return Err(ProtocolError::Empty);
        }

        let mut prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (p, tail) = stripped
                .split_once(' ')
                .ok_or(ProtocolError::MissingCommand)?;
            prefix = Some(p.to_string());
            rest = tail.trim_start_matches(' ');
        }

        let (command, mut rest) = match rest.split_once(' ') {
            Some((cmd, tail)) => (cmd, tail),
            None => (rest, ""),
        };
        if command.is_empty() {
            return Err(ProtocolError::MissingCommand);
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing.to_string());
                break;
            }
            match rest.split_once(' ') {
                Some((param, tail)) => {
                    params.push(param.to_string());
                    rest = tail;
                }
                None => {
                    params.push(rest.to_string());
                    break;
                }
            }
        }

        Ok(Self {
            prefix,
            command: command.to_ascii_uppercase(),
            params,
        })
    }

    /// Parameter `n`, if present.
    #[inline]
    pub fn arg(&self, n: usize) -> Option<&str> {
        self.params.get(n).map(String::as_str)
    }

    /// Parameter `n` when present and non-empty.
    #[inline]
    pub fn nonempty_arg(&self, n: usize) -> Option<&str> {
        self.arg(n).filter(|s| !s.is_empty())
    }

    /// Render with the CR-LF terminator.
    pub fn to_line(&self) -> String {
        let mut out = self.to_string();
        out.push_str("\r\n");
        out
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{prefix} ")?;
        }
        f.write_str(&self.command)?;

        if let Some((last, middle)) = self.params.split_last() {
            for param in middle {
                write!(f, " {param}")?;
            }
            if last.is_empty() || last.contains(' ') || last.starts_with(':') {
                write!(f, " :{last}")?;
            } else {
                write!(f, " {last}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_and_params() {
        let msg = Message::parse("join #a,#b key\r\n").unwrap();
        assert_eq!(msg.prefix, None);
        assert_eq!(msg.command, "JOIN");
        assert_eq!(msg.params, vec!["#a,#b", "key"]);
    }

    #[test]
    fn parses_prefix_and_trailing() {
        let msg = Message::parse(":alice!a@host PRIVMSG #test :hello  world :)").unwrap();
        assert_eq!(msg.prefix.as_deref(), Some("alice!a@host"));
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["#test", "hello  world :)"]);
    }

    #[test]
    fn trailing_may_be_empty() {
        let msg = Message::parse("TOPIC #test :").unwrap();
        assert_eq!(msg.params, vec!["#test", ""]);
    }

    #[test]
    fn no_params() {
        let msg = Message::parse("QUIT").unwrap();
        assert!(msg.params.is_empty());
    }

    #[test]
    fn rejects_empty_and_prefix_only() {
        assert!(matches!(Message::parse("\r\n"), Err(ProtocolError::Empty)));
        assert!(matches!(
            Message::parse(":server"),
            Err(ProtocolError::MissingCommand)
        ));
    }

    #[test]
    fn encodes_trailing_rule() {
        let msg = Message::new("PRIVMSG", vec!["#test".into(), "hi there".into()]);
        assert_eq!(msg.to_string(), "PRIVMSG #test :hi there");

        let msg = Message::new("TOPIC", vec!["#test".into(), String::new()]);
        assert_eq!(msg.to_string(), "TOPIC #test :");

        let msg = Message::new("PRIVMSG", vec!["bob".into(), ":)".into()]);
        assert_eq!(msg.to_string(), "PRIVMSG bob ::)");

        let msg = Message::new("JOIN", vec!["#test".into()]).with_prefix("a!b@c");
        assert_eq!(msg.to_line(), ":a!b@c JOIN #test\r\n");
    }

    #[test]
    fn decode_inverts_encode() {
        let original = Message::new(
            "KICK",
            vec!["#chan".into(), "bob".into(), "go away".into()],
        )
        .with_prefix("alice!a@h");
        let decoded = Message::parse(&original.to_line()).unwrap();
        assert_eq!(decoded, original);
    }
}
