//! Glob masks over `nick!user@host` identities.
//!
//! `*` matches any run of characters (including none) and `?` matches exactly
//! one. Matching is case-insensitive and anchored at both ends. Each part of
//! a `nick!user@host` mask is compiled and matched on its own.

use regex::{Regex, RegexBuilder};

use crate::error::MaskError;

/// A compiled glob pattern.
#[derive(Clone, Debug)]
pub struct Mask {
    pattern: String,
    regex: Regex,
}

impl Mask {
    /// Compile `pattern`. Empty patterns and patterns containing `**` are rejected.
    pub fn compile(pattern: &str) -> Result<Self, MaskError> {
        if pattern.is_empty() {
            return Err(MaskError::Empty);
        }
        if pattern.contains("**") {
            return Err(MaskError::ConsecutiveWildcards(pattern.to_string()));
        }

        let mut source = String::with_capacity(pattern.len() + 8);
        source.push('^');
        let mut literal = String::new();
        for c in pattern.chars() {
            match c {
                '*' | '?' => {
                    source.push_str(&regex::escape(&literal));
                    literal.clear();
                    source.push_str(if c == '*' { ".*" } else { "." });
                }
                _ => literal.push(c),
            }
        }
        source.push_str(&regex::escape(&literal));
        source.push('$');

        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| MaskError::Rejected(e.to_string()))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Whether `candidate` matches the whole pattern.
    #[inline]
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// The source pattern.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

/// The three parts of a `nick!user@host` mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskParts {
    /// Nickname part.
    pub nick: String,
    /// Username part.
    pub user: String,
    /// Host part.
    pub host: String,
}

/// Split a mask into its parts. Missing or empty parts become `*`.
///
/// The first `!` and the last `@` are the separators. When `!` comes after
/// `@` the whole mask is treated as a host.
pub fn parse_mask(mask: &str) -> MaskParts {
    let bang = mask.find('!');
    let at = mask.rfind('@');

    let (nick, user, host) = match (bang, at) {
        (None, None) => ("", "", mask),
        (None, Some(j)) => ("", &mask[..j], &mask[j + 1..]),
        (Some(i), None) => (&mask[..i], &mask[i + 1..], ""),
        (Some(i), Some(j)) if i < j => (&mask[..i], &mask[i + 1..j], &mask[j + 1..]),
        (Some(_), Some(_)) => ("", "", mask),
    };

    let or_star = |s: &str| {
        if s.is_empty() {
            "*".to_string()
        } else {
            s.to_string()
        }
    };
    MaskParts {
        nick: or_star(nick),
        user: or_star(user),
        host: or_star(host),
    }
}

/// Join parts into `nick!user@host`, using `*` for empty parts.
pub fn format_mask(nick: &str, user: &str, host: &str) -> String {
    let part = |s: &str| if s.is_empty() { "*" } else { s }.to_string();
    format!("{}!{}@{}", part(nick), part(user), part(host))
}

/// Whether every part of `mask` compiles.
pub fn validate_mask(mask: &str) -> bool {
    let parts = parse_mask(mask);
    [&parts.nick, &parts.user, &parts.host]
        .iter()
        .all(|p| Mask::compile(p).is_ok())
}

fn part_matches(candidate: &str, pattern: &str) -> bool {
    Mask::compile(pattern).is_ok_and(|m| m.is_match(candidate))
}

/// Match a full candidate mask against a ban mask, part by part.
pub fn matches_user_mask(candidate: &str, ban: &str) -> bool {
    let c = parse_mask(candidate);
    let b = parse_mask(ban);
    part_matches(&c.nick, &b.nick) && part_matches(&c.user, &b.user) && part_matches(&c.host, &b.host)
}

/// Host-only matching. A pattern with neither `!` nor `@` is compared with the
/// host segment of `candidate`; anything else is full mask matching.
pub fn matches_host(candidate: &str, pattern: &str) -> bool {
    if pattern.contains(['!', '@']) {
        return matches_user_mask(candidate, pattern);
    }
    let host = candidate
        .rfind('@')
        .map_or(candidate, |idx| &candidate[idx + 1..]);
    part_matches(host, pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_rejects_empty_and_double_star() {
        assert_eq!(Mask::compile("").unwrap_err(), MaskError::Empty);
        assert!(matches!(
            Mask::compile("a**b"),
            Err(MaskError::ConsecutiveWildcards(_))
        ));
    }

    #[test]
    fn glob_is_anchored() {
        let m = Mask::compile("*!*@192.168.*").unwrap();
        assert!(m.is_match("alice!bob@192.168.1.5"));
        assert!(!m.is_match("alice!bob@10.0.0.1"));

        let m = Mask::compile("a?c").unwrap();
        assert!(m.is_match("abc"));
        assert!(!m.is_match("abbc"));
        assert!(!m.is_match("xabc"));
    }

    #[test]
    fn glob_is_case_insensitive_and_literal() {
        let m = Mask::compile("Alice.(x)+").unwrap();
        assert!(m.is_match("alice.(X)+"));
        assert!(!m.is_match("aliceX(x)+"));
    }

    #[test]
    fn parse_mask_grammar() {
        let full = |n: &str, u: &str, h: &str| MaskParts {
            nick: n.into(),
            user: u.into(),
            host: h.into(),
        };
        assert_eq!(parse_mask("n!u@h"), full("n", "u", "h"));
        assert_eq!(parse_mask("host.example"), full("*", "*", "host.example"));
        assert_eq!(parse_mask("u@h"), full("*", "u", "h"));
        assert_eq!(parse_mask("n!u"), full("n", "u", "*"));
        assert_eq!(parse_mask("n!u@h@x"), full("n", "u@h", "x"));
        assert_eq!(parse_mask("u@h!n"), full("*", "*", "u@h!n"));
        assert_eq!(parse_mask("!@"), full("*", "*", "*"));
    }

    #[test]
    fn format_fills_stars() {
        assert_eq!(format_mask("bob", "", "host"), "bob!*@host");
    }

    #[test]
    fn user_mask_matches_per_part() {
        assert!(matches_user_mask("alice!bob@192.168.1.5", "*!*@192.168.*"));
        assert!(matches_user_mask("Alice!bob@host", "alice!*@*"));
        assert!(!matches_user_mask("alice!bob@host", "*!carol@*"));
        assert!(matches_user_mask("alice!bob@host", "host"));
        assert!(!matches_user_mask("alice!bob@host", "alice"));
        assert!(!matches_user_mask("alice!bob@host", "a**"));
    }

    #[test]
    fn host_matching() {
        assert!(matches_host("alice!bob@10.0.0.1", "10.0.*"));
        assert!(!matches_host("alice!bob@10.0.0.1", "192.*"));
        assert!(matches_host("alice!bob@10.0.0.1", "*@10.0.0.?"));
        assert!(matches_host("localhost", "local*"));
    }

    #[test]
    fn validate() {
        assert!(validate_mask("*!*@*.example.org"));
        assert!(!validate_mask("**!*@*"));
    }
}
