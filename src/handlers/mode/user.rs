//! User mode handling.
//!
//! Handles MODE commands for users: `MODE <nick> [+/-modes]`
//! Users can only query/change their own modes.

use tinyircd_proto::{ModeDirection, Response, irc_eq};
use tracing::{debug, info};

use super::super::Context;
use super::common::ModeLine;
use crate::error::{HandlerError, HandlerResult};
use crate::state::UserModes;

/// Handle user mode query/change.
pub fn handle_user_mode(ctx: &Context<'_>, target: &str, modes: Option<&str>) -> HandlerResult {
    let nick = ctx.nick();

    // Can only query/change your own modes
    if !irc_eq(target, &nick) {
        return Err(HandlerError::UsersDontMatch);
    }

    let Some(modes) = modes.filter(|m| !m.is_empty()) else {
        let current = ctx.client.state().modes.as_mode_string();
        ctx.reply(Response::RPL_UMODEIS, &current);
        return Ok(());
    };

    let (applied, rejected) = {
        let mut state = ctx.client.state_mut();
        let was_oper = state.modes.oper;
        let result = apply_user_modes(&mut state.modes, modes);
        if was_oper && !state.modes.oper {
            state.vhost = None;
            state.whois_note = None;
            info!(nick = %nick, "Operator status dropped");
        }
        result
    };

    if !applied.is_empty() {
        debug!(nick = %nick, modes = %applied.letters(), "User modes changed");
        ctx.send(format!(":{nick} MODE {nick} :{}", applied.letters()));
    }

    for err in &rejected {
        ctx.send_error(err, "MODE");
    }
    Ok(())
}

/// Apply user mode changes, returns (applied, rejected).
///
/// `+o` can only be gained through OPER; `-o` drops it.
fn apply_user_modes(user_modes: &mut UserModes, modes: &str) -> (ModeLine, Vec<HandlerError>) {
    let mut applied = ModeLine::default();
    let mut rejected = Vec::new();
    let mut direction = ModeDirection::Add;

    for c in modes.chars() {
        let add = direction == ModeDirection::Add;
        let slot = match c {
            '+' => {
                direction = ModeDirection::Add;
                continue;
            }
            '-' => {
                direction = ModeDirection::Remove;
                continue;
            }
            'i' => &mut user_modes.invisible,
            'w' => &mut user_modes.wallops,
            'o' if add && !user_modes.oper => {
                rejected.push(HandlerError::NoPrivileges);
                continue;
            }
            'o' => &mut user_modes.oper,
            _ => {
                rejected.push(HandlerError::UnknownUserMode);
                continue;
            }
        };
        if *slot != add {
            *slot = add;
            applied.push(direction, c, None);
        }
    }

    (applied, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{Harness, drain};

    #[test]
    fn test_apply_user_modes() {
        let mut modes = UserModes::default();
        let (applied, rejected) = apply_user_modes(&mut modes, "+iw-i+x");
        assert_eq!(applied.letters(), "+iw-i");
        assert_eq!(rejected.len(), 1);
        assert!(!modes.invisible);
        assert!(modes.wallops);

        let (applied, rejected) = apply_user_modes(&mut modes, "+o");
        assert!(applied.is_empty());
        assert!(matches!(rejected[..], [HandlerError::NoPrivileges]));
    }

    #[tokio::test]
    async fn test_user_mode_query_and_change() {
        let h = Harness::new();
        let (alice, mut ra) = h.registered(1, "alice");

        h.run(&alice, "MODE alice").await.unwrap();
        assert_eq!(drain(&mut ra), vec![":irc.test 221 alice +"]);

        h.run(&alice, "MODE Alice +iz").await.unwrap();
        assert_eq!(
            drain(&mut ra),
            vec![
                ":alice MODE alice :+i",
                ":irc.test 501 alice :Unknown MODE flag",
            ]
        );

        h.run(&alice, "MODE alice").await.unwrap();
        assert_eq!(drain(&mut ra), vec![":irc.test 221 alice +i"]);
    }

    #[tokio::test]
    async fn test_user_mode_other_user() {
        let h = Harness::new();
        let (alice, mut ra) = h.registered(1, "alice");
        let (_bob, _rb) = h.registered(2, "bob");

        h.run(&alice, "MODE bob +i").await.unwrap_err();
        assert_eq!(
            drain(&mut ra),
            vec![":irc.test 502 alice :Cannot change mode for other users"]
        );
    }

    #[tokio::test]
    async fn test_deoper_self() {
        let h = Harness::new();
        let (alice, mut ra) = h.registered(1, "alice");
        alice.state_mut().modes.oper = true;

        h.run(&alice, "MODE alice +o").await.unwrap();
        assert!(drain(&mut ra).is_empty());

        h.run(&alice, "MODE alice -o").await.unwrap();
        assert_eq!(drain(&mut ra), vec![":alice MODE alice :-o"]);
        assert!(!alice.is_oper());
    }
}
