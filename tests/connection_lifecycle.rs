//! Integration tests for registration, keep-alive and disconnect handling.

mod common;

use std::time::Duration;

use common::{TestClient, TestServer};

#[tokio::test]
async fn test_registration_welcome_burst() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let mut alice = TestClient::connect(&server.address(), "alice")
        .await
        .expect("Failed to connect");

    alice.send_raw("NICK alice").await.unwrap();
    alice.send_raw("USER alice 0 * :Alice Liddell").await.unwrap();

    let burst = alice.recv_until(|m| m.command == "004").await.unwrap();
    let codes: Vec<&str> = burst.iter().map(|m| m.command.as_str()).collect();
    assert_eq!(codes, vec!["001", "002", "003", "004"]);

    let welcome = &burst[0];
    assert_eq!(welcome.prefix.as_deref(), Some("test.server"));
    assert_eq!(welcome.params[0], "alice");
    assert!(welcome.params[1].ends_with("alice!alice@127.0.0.1"));
    assert_eq!(burst[3].params[1], "test.server");
}

#[tokio::test]
async fn test_commands_before_registration_are_refused() {
    let server = TestServer::spawn().await.unwrap();
    let mut client = TestClient::connect(&server.address(), "early").await.unwrap();

    client.send_raw("JOIN #test").await.unwrap();
    let reply = client.expect("451").await.unwrap();
    assert_eq!(reply.params[0], "*");

    client.send_raw("PING early-token").await.unwrap();
    let pong = client.expect("PONG").await.unwrap();
    assert_eq!(pong.params.last().map(String::as_str), Some("early-token"));
}

#[tokio::test]
async fn test_nick_collision_is_case_insensitive() {
    let server = TestServer::spawn().await.unwrap();
    let _alice = TestClient::connect_registered(&server.address(), "Alice")
        .await
        .unwrap();

    let mut other = TestClient::connect(&server.address(), "alice").await.unwrap();
    other.send_raw("NICK aLiCe").await.unwrap();
    let reply = other.expect("433").await.unwrap();
    assert_eq!(reply.params[1], "aLiCe");

    // A free nick still completes registration afterwards.
    other.send_raw("NICK bob").await.unwrap();
    other.send_raw("USER bob 0 * :Bob").await.unwrap();
    other.expect("001").await.unwrap();
}

#[tokio::test]
async fn test_nick_change_is_seen_by_channel_peers() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = TestClient::connect_registered(&server.address(), "alice")
        .await
        .unwrap();
    let mut bob = TestClient::connect_registered(&server.address(), "bob")
        .await
        .unwrap();
    alice.join("#room").await.unwrap();
    bob.join("#room").await.unwrap();
    alice.drain().await;

    bob.send_raw("NICK robert").await.unwrap();
    let change = alice.expect("NICK").await.unwrap();
    assert_eq!(change.prefix.as_deref(), Some("bob!bob@127.0.0.1"));
    assert_eq!(change.params, vec!["robert"]);
}

#[tokio::test]
async fn test_quit_notifies_peers_and_closes() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = TestClient::connect_registered(&server.address(), "alice")
        .await
        .unwrap();
    let mut bob = TestClient::connect_registered(&server.address(), "bob")
        .await
        .unwrap();
    alice.join("#room").await.unwrap();
    bob.join("#room").await.unwrap();
    alice.drain().await;

    bob.quit(Some("see you")).await.unwrap();
    let tail = bob.recv_until_closed().await.unwrap();
    let error = tail
        .iter()
        .find(|m| m.command == "ERROR")
        .expect("ERROR before close");
    assert_eq!(error.params[0], "Closing Link: 127.0.0.1 (see you)");

    let quit = alice.expect("QUIT").await.unwrap();
    assert_eq!(quit.prefix.as_deref(), Some("bob!bob@127.0.0.1"));
    assert_eq!(quit.params, vec!["see you"]);

    // The nick is free again.
    let _bob = TestClient::connect_registered(&server.address(), "bob")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_dropped_connection_sends_quit() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = TestClient::connect_registered(&server.address(), "alice")
        .await
        .unwrap();
    let mut bob = TestClient::connect_registered(&server.address(), "bob")
        .await
        .unwrap();
    alice.join("#room").await.unwrap();
    bob.join("#room").await.unwrap();
    alice.drain().await;

    drop(bob);
    let quit = alice.expect("QUIT").await.unwrap();
    assert_eq!(quit.params, vec!["Connection closed"]);
}

#[tokio::test]
async fn test_blank_and_garbage_lines_are_ignored() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = TestClient::connect_registered(&server.address(), "alice")
        .await
        .unwrap();

    alice.send_raw("").await.unwrap();
    alice.send_raw(":onlyprefix").await.unwrap();
    alice.send_raw("PING still-here").await.unwrap();
    let pong = alice.recv_timeout(Duration::from_secs(5)).await.unwrap();
    assert_eq!(pong.command, "PONG");
}
