//! Nickname and channel name grammar, plus UTF-8 safe truncation.

/// Characters that never appear in a nickname or channel name.
const FORBIDDEN: &[char] = &[' ', ',', '\0', '\x07', '\r', '\n'];

/// Channel names start with `#` or `&` and contain no separators or controls.
pub fn is_valid_channel_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some('#' | '&'))
        && name.len() > 1
        && !name.contains(FORBIDDEN)
}

/// Nicknames may not look like a channel, a prefix or a mask.
pub fn is_valid_nickname(nick: &str) -> bool {
    match nick.chars().next() {
        None | Some('#' | '&' | ':' | '$') => false,
        Some(_) => !nick.contains(FORBIDDEN) && !nick.contains(['!', '@', '*', '?']),
    }
}

/// Truncate to at most `max_bytes` without splitting a codepoint.
#[inline]
pub fn truncate_utf8_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
