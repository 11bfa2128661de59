//! Helper functions for IRC command handlers.
//!
//! Line builders and mask expansion shared by several handlers.

use crate::state::Matrix;

// ============================================================================
// Common line builders
// ============================================================================

/// `:<server> NOTICE <target> :<text>`
pub fn server_notice(server_name: &str, target: &str, text: &str) -> String {
    format!(":{server_name} NOTICE {target} :{text}")
}

// ============================================================================
// Ban masks
// ============================================================================

/// Turn a BAN argument into a storable mask.
///
/// A bare nick (no `!`, `@`, `*` or `?`) becomes the live user's full mask, or
/// `<nick>!*@*` when nobody holds it. Anything else is returned unchanged.
pub fn expand_ban_mask(matrix: &Matrix, arg: &str) -> String {
    if arg.contains(['!', '@', '*', '?']) {
        return arg.to_string();
    }
    match matrix.lookup_client(arg) {
        Some(client) => client.mask(),
        None => format!("{arg}!*@*"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::Harness;

    #[test]
    fn test_expand_ban_mask() {
        let h = Harness::new();
        let (_alice, _rx) = h.registered(1, "alice");

        assert_eq!(expand_ban_mask(&h.matrix, "ALICE"), "alice!alice@127.0.0.1");
        assert_eq!(expand_ban_mask(&h.matrix, "ghost"), "ghost!*@*");
        assert_eq!(expand_ban_mask(&h.matrix, "*!*@10.*"), "*!*@10.*");
        assert_eq!(expand_ban_mask(&h.matrix, "bob@host"), "bob@host");
    }

    #[test]
    fn test_server_notice() {
        assert_eq!(
            server_notice("irc.test", "*", "Server is shutting down"),
            ":irc.test NOTICE * :Server is shutting down"
        );
    }
}
