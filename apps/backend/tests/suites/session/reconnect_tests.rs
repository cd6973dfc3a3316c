use std::time::Duration;

use fgame::domain::room::SERVER_AUTHOR;
use fgame::{mint_identity_token, ErrorCode, SecurityConfig};

use crate::support::{seat_players, settle, test_state, TestClient};

#[tokio::test(start_paused = true)]
async fn login_within_grace_restores_identity_and_room() {
    let state = test_state();
    let (mut clients, room) = seat_players(&state, &["alice", "bob"]);
    let token = {
        let (client, token) = TestClient::register(&state, "carol");
        client.act(&state, "joinRoom", &room);
        clients.push(client);
        token
    };
    let carol = state
        .directory()
        .lookup_player(clients[2].connection.id())
        .unwrap();
    let carol_id = carol.id();
    assert_eq!(carol.award_point(), 1);
    drop(carol);
    for client in clients.iter_mut() {
        client.drain();
    }

    state.directory().disconnect(clients[2].connection.id());
    tokio::time::sleep(Duration::from_secs(5)).await;

    let mut resumed = TestClient::new();
    resumed.act(&state, "login", &token);

    let (self_room, _) = resumed.last_self().expect("self after login");
    assert_eq!(self_room, room);
    let player = state
        .directory()
        .lookup_player(resumed.connection.id())
        .unwrap();
    assert_eq!(player.id(), carol_id);
    assert!(!player.has_grace());
    assert_eq!(player.score(), 1);

    let snapshot = clients[0].last_room_state().expect("room state resent");
    assert_eq!(snapshot.players.len(), 3);
    let carol_view = snapshot
        .players
        .iter()
        .find(|p| p.name == "carol")
        .expect("carol still seated");
    assert_eq!(carol_view.score, 1);

    // The cancelled grace must not evict later.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(state.directory().player_count(), 3);
    assert!(state.directory().lookup_room(&room).unwrap().contains(carol_id));
}

#[tokio::test(start_paused = true)]
async fn grace_expiry_evicts_player_from_room() {
    let state = test_state();
    let (mut clients, room) = seat_players(&state, &["alice", "bob"]);

    state.directory().disconnect(clients[1].connection.id());
    tokio::time::sleep(Duration::from_secs(9)).await;
    assert_eq!(state.directory().player_count(), 2);

    tokio::time::sleep(Duration::from_secs(2)).await;
    settle().await;

    assert_eq!(state.directory().player_count(), 1);
    assert_eq!(state.directory().lookup_room(&room).unwrap().member_count(), 1);
    assert!(clients[0]
        .chats()
        .contains(&(SERVER_AUTHOR.to_string(), "Player bob has left".to_string())));
}

#[tokio::test(start_paused = true)]
async fn login_after_grace_is_rejected() {
    let state = test_state();
    let (client, token) = TestClient::register(&state, "alice");

    state.directory().disconnect(client.connection.id());
    tokio::time::sleep(Duration::from_secs(11)).await;

    let mut late = TestClient::new();
    late.act(&state, "login", &token);
    assert_eq!(late.error_codes(), vec![ErrorCode::InvalidToken.as_u16()]);

    // The name can be taken by someone new.
    late.act(&state, "register", "alice");
    assert!(late.error_codes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn second_disconnect_extends_grace() {
    let state = test_state();
    let (client, _token) = TestClient::register(&state, "alice");

    state.directory().disconnect(client.connection.id());
    tokio::time::sleep(Duration::from_secs(8)).await;
    state.directory().disconnect(client.connection.id());

    tokio::time::sleep(Duration::from_secs(7)).await;
    assert_eq!(state.directory().player_count(), 1);

    tokio::time::sleep(Duration::from_secs(4)).await;
    settle().await;
    assert_eq!(state.directory().player_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn login_rejects_bad_tokens() {
    let state = test_state();
    let (alice, _) = TestClient::register(&state, "alice");
    let alice_id = state
        .directory()
        .lookup_player(alice.connection.id())
        .unwrap()
        .id();
    let forged = mint_identity_token(
        "alice",
        alice_id,
        std::time::SystemTime::now(),
        &SecurityConfig::new("some-other-secret".as_bytes()),
    )
    .unwrap();

    let mut client = TestClient::new();
    client.act(&state, "login", "not-a-token");
    client.act(&state, "login", "");
    client.act(&state, "login", &forged);

    assert_eq!(
        client.error_codes(),
        vec![ErrorCode::InvalidToken.as_u16(); 3]
    );
    assert!(state.directory().lookup_player(client.connection.id()).is_none());
}

#[tokio::test(start_paused = true)]
async fn login_over_another_player_puts_that_player_in_grace() {
    let state = test_state();
    let (alice, alice_token) = TestClient::register(&state, "alice");
    let (mut shared, _) = TestClient::register(&state, "bob");

    state.directory().disconnect(alice.connection.id());
    shared.act(&state, "login", &alice_token);
    assert_eq!(
        state
            .directory()
            .lookup_player(shared.connection.id())
            .unwrap()
            .name(),
        "alice"
    );

    tokio::time::sleep(Duration::from_secs(11)).await;
    settle().await;

    // Bob was displaced from the shared connection and timed out.
    assert_eq!(state.directory().player_count(), 1);
    assert!(shared.error_codes().is_empty());
}
