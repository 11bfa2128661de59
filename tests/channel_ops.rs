//! Integration tests for channel operator commands and channel modes.

mod common;

use common::{TestClient, TestServer};

/// alice creates `channel` (and so holds ops), bob joins it.
async fn setup(server: &TestServer, channel: &str) -> (TestClient, TestClient) {
    let mut alice = TestClient::connect_registered(&server.address(), "alice")
        .await
        .unwrap();
    let mut bob = TestClient::connect_registered(&server.address(), "bob")
        .await
        .unwrap();
    alice.join(channel).await.unwrap();
    bob.join(channel).await.unwrap();
    alice.drain().await;
    (alice, bob)
}

#[tokio::test]
async fn test_mode_query_shows_defaults() {
    let server = TestServer::spawn().await.unwrap();
    let (_alice, mut bob) = setup(&server, "#modes").await;

    bob.send_raw("MODE #modes").await.unwrap();
    let modes = bob.expect("324").await.unwrap();
    assert_eq!(modes.params[1..], ["#modes", "+nt"]);
    bob.expect("329").await.unwrap();
}

#[tokio::test]
async fn test_key_and_limit_enforced_on_join() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = TestClient::connect_registered(&server.address(), "alice")
        .await
        .unwrap();
    let mut bob = TestClient::connect_registered(&server.address(), "bob")
        .await
        .unwrap();
    alice.join("#locked").await.unwrap();

    alice.send_raw("MODE #locked +k sesame").await.unwrap();
    let change = alice.expect("MODE").await.unwrap();
    assert_eq!(change.params, vec!["#locked", "+k", "sesame"]);

    bob.send_raw("JOIN #locked wrong").await.unwrap();
    bob.expect("475").await.unwrap();

    alice.send_raw("MODE #locked -k+l * 1").await.unwrap();
    let change = alice.expect("MODE").await.unwrap();
    assert_eq!(change.params, vec!["#locked", "-k+l", "sesame", "1"]);

    bob.send_raw("JOIN #locked").await.unwrap();
    bob.expect("471").await.unwrap();
}

#[tokio::test]
async fn test_non_operator_cannot_change_modes() {
    let server = TestServer::spawn().await.unwrap();
    let (_alice, mut bob) = setup(&server, "#guarded").await;

    bob.send_raw("MODE #guarded +m").await.unwrap();
    let reply = bob.expect("482").await.unwrap();
    assert_eq!(reply.params[1], "#guarded");

    bob.send_raw("KICK #guarded alice").await.unwrap();
    bob.expect("482").await.unwrap();
}

#[tokio::test]
async fn test_moderated_channel_needs_voice() {
    let server = TestServer::spawn().await.unwrap();
    let (mut alice, mut bob) = setup(&server, "#quiet").await;

    alice.send_raw("MODE #quiet +m").await.unwrap();
    bob.expect("MODE").await.unwrap();

    bob.privmsg("#quiet", "can I talk?").await.unwrap();
    bob.expect("404").await.unwrap();

    alice.send_raw("MODE #quiet +v bob").await.unwrap();
    let voice = bob.expect("MODE").await.unwrap();
    assert_eq!(voice.params, vec!["#quiet", "+v", "bob"]);

    bob.privmsg("#quiet", "now I can").await.unwrap();
    let msg = alice.expect("PRIVMSG").await.unwrap();
    assert_eq!(msg.params[1], "now I can");
}

#[tokio::test]
async fn test_kick_removes_member() {
    let server = TestServer::spawn().await.unwrap();
    let (mut alice, mut bob) = setup(&server, "#kick").await;

    alice.send_raw("KICK #kick bob :behave").await.unwrap();
    let kick = bob.expect("KICK").await.unwrap();
    assert_eq!(kick.prefix.as_deref(), Some("alice!alice@127.0.0.1"));
    assert_eq!(kick.params, vec!["#kick", "bob", "behave"]);
    alice.expect("KICK").await.unwrap();

    bob.privmsg("#kick", "still here?").await.unwrap();
    bob.expect("404").await.unwrap();
}

#[tokio::test]
async fn test_ban_blocks_rejoin() {
    let server = TestServer::spawn().await.unwrap();
    let (mut alice, mut bob) = setup(&server, "#banned").await;

    alice.send_raw("BAN #banned bob").await.unwrap();
    let ban = bob.expect("MODE").await.unwrap();
    assert_eq!(ban.params, vec!["#banned", "+b", "bob!*@*"]);

    alice.send_raw("KICK #banned bob").await.unwrap();
    bob.expect("KICK").await.unwrap();

    bob.send_raw("JOIN #banned").await.unwrap();
    bob.expect("474").await.unwrap();

    alice.send_raw("MODE #banned b").await.unwrap();
    let entry = alice.expect("367").await.unwrap();
    assert_eq!(entry.params[2], "bob!*@*");
    alice.expect("368").await.unwrap();
}

#[tokio::test]
async fn test_invite_only_and_invite() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = TestClient::connect_registered(&server.address(), "alice")
        .await
        .unwrap();
    let mut bob = TestClient::connect_registered(&server.address(), "bob")
        .await
        .unwrap();
    alice.join("#vip").await.unwrap();
    alice.send_raw("MODE #vip +i").await.unwrap();
    alice.expect("MODE").await.unwrap();

    bob.send_raw("JOIN #vip").await.unwrap();
    bob.expect("473").await.unwrap();

    alice.send_raw("INVITE bob #vip").await.unwrap();
    alice.expect("341").await.unwrap();
    let invite = bob.expect("INVITE").await.unwrap();
    assert_eq!(invite.params, vec!["bob", "#vip"]);

    bob.join("#vip").await.unwrap();
}

#[tokio::test]
async fn test_op_and_deop_shortcuts() {
    let server = TestServer::spawn().await.unwrap();
    let (mut alice, mut bob) = setup(&server, "#staff").await;

    alice.send_raw("OP #staff bob").await.unwrap();
    let op = bob.expect("MODE").await.unwrap();
    assert_eq!(op.params, vec!["#staff", "+o", "bob"]);

    bob.send_raw("DEOP #staff alice").await.unwrap();
    let deop = alice
        .recv_until(|m| m.command == "MODE" && m.params.get(1).is_some_and(|p| p == "-o"))
        .await
        .unwrap();
    let deop = deop.last().expect("MODE -o");
    assert_eq!(deop.prefix.as_deref(), Some("bob!bob@127.0.0.1"));
    assert_eq!(deop.params, vec!["#staff", "-o", "alice"]);
}
