// Multi-socket room traffic

use std::sync::Arc;
use std::time::Duration;

use fgame::middleware::rate_limit::MessageLimiter;

use crate::support::websocket::start_test_server;
use crate::support::websocket_client::WebSocketClient;
use crate::support::{test_config, test_state, test_state_with_limiter};

const WAIT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn two_players_share_a_room_and_chat() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_test_server(test_state()).await?;
    let mut alice = WebSocketClient::connect_retry(&server.ws_url(), WAIT).await?;
    let mut bob = WebSocketClient::connect_retry(&server.ws_url(), WAIT).await?;

    alice.act("register", "alice").await?;
    bob.act("register", "bob").await?;
    alice.recv_kind("jwt", WAIT).await?;
    bob.recv_kind("jwt", WAIT).await?;

    alice.act("createRoom", "").await?;
    let room = alice.recv_kind("roomState", WAIT).await?["roomName"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    bob.act("joinRoom", &room).await?;
    let joined = alice.recv_kind("chat", WAIT).await?;
    assert_eq!(joined["author"], "Server");
    assert_eq!(joined["chatMessage"], "Player bob has joined");

    let snapshot = bob.recv_kind("roomState", WAIT).await?;
    assert_eq!(snapshot["gameStage"], 0);
    assert_eq!(snapshot["players"].as_array().map(Vec::len), Some(2));

    bob.act("sendMessage", "hi alice").await?;
    let chat = alice.recv_kind("chat", WAIT).await?;
    assert_eq!(chat["author"], "bob");
    assert_eq!(chat["chatMessage"], "hi alice");

    alice.act("startGame", "").await?;
    let writing = loop {
        let state = bob.recv_kind("roomState", WAIT).await?;
        if state["gameStage"] == 1 {
            break state;
        }
    };
    assert!(writing["question"].as_str().is_some_and(|q| !q.is_empty()));

    alice.close().await?;
    bob.close().await?;
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn rejected_action_comes_back_as_error() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_test_server(test_state()).await?;
    let mut client = WebSocketClient::connect_retry(&server.ws_url(), WAIT).await?;

    client.act("register", "alice").await?;
    client.recv_kind("jwt", WAIT).await?;
    client.act("joinRoom", "NOSUCHRM").await?;

    let error = client.recv_json(WAIT).await?;
    assert_eq!(error["msgType"], "error");
    assert_eq!(error["errorCode"], 20);

    client.close().await?;
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn messages_over_the_burst_are_dropped() -> Result<(), Box<dyn std::error::Error>> {
    let limiter = Arc::new(MessageLimiter::new(2, Duration::from_secs(60)));
    let server = start_test_server(test_state_with_limiter(test_config(), limiter)).await?;
    let mut client = WebSocketClient::connect_retry(&server.ws_url(), WAIT).await?;

    client.act("register", "alice").await?;
    client.recv_kind("jwt", WAIT).await?;
    client.act("joinRoom", "NOSUCHRM").await?;
    assert_eq!(client.recv_json(WAIT).await?["errorCode"], 20);

    client.act("joinRoom", "NOSUCHRM").await?;
    assert!(client.is_quiet(Duration::from_millis(200)).await);

    client.close().await?;
    server.stop().await;
    Ok(())
}
