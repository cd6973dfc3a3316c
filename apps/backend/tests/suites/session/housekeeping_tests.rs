use std::time::Duration;

use fgame::services::spawn_housekeeping;
use fgame::ws::protocol::ServerMsg;
use fgame::GameConfig;

use crate::support::{settle, test_config, test_state_with, TestClient};

fn config() -> GameConfig {
    GameConfig {
        status_interval: Duration::from_secs(10),
        gc_interval: Duration::from_secs(60),
        ..test_config()
    }
}

fn statuses(client: &mut TestClient) -> Vec<(usize, usize)> {
    client
        .drain()
        .into_iter()
        .filter_map(|msg| match msg {
            ServerMsg::Status {
                player_count,
                room_count,
            } => Some((player_count, room_count)),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn status_goes_to_every_player_each_period() {
    let state = test_state_with(config());
    let _housekeeping = spawn_housekeeping(state.directory().clone(), &state.config);
    let (mut alice, _) = TestClient::register(&state, "alice");
    let (mut bob, _) = TestClient::register(&state, "bob");
    bob.act(&state, "createRoom", "");
    bob.drain();

    tokio::time::sleep(Duration::from_secs(9)).await;
    assert!(statuses(&mut alice).is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    settle().await;
    assert_eq!(statuses(&mut alice), vec![(2, 1)]);
    assert_eq!(statuses(&mut bob), vec![(2, 1)]);

    tokio::time::sleep(Duration::from_secs(10)).await;
    settle().await;
    assert_eq!(statuses(&mut alice), vec![(2, 1)]);
}

#[tokio::test(start_paused = true)]
async fn sweep_reclaims_only_empty_rooms() {
    let state = test_state_with(config());
    let _housekeeping = spawn_housekeeping(state.directory().clone(), &state.config);

    let (mut alice, _) = TestClient::register(&state, "alice");
    alice.act(&state, "createRoom", "");
    let abandoned = alice.last_room_state().unwrap().room_name;
    alice.act(&state, "leaveRoom", "");

    let (mut bob, _) = TestClient::register(&state, "bob");
    bob.act(&state, "createRoom", "");
    let occupied = bob.last_room_state().unwrap().room_name;
    assert_eq!(state.directory().room_count(), 2);

    tokio::time::sleep(Duration::from_secs(61)).await;
    settle().await;

    assert_eq!(state.directory().room_count(), 1);
    assert!(state.directory().lookup_room(&abandoned).is_err());
    assert!(state.directory().lookup_room(&occupied).is_ok());
}

#[tokio::test(start_paused = true)]
async fn dropping_housekeeping_stops_the_tasks() {
    let state = test_state_with(config());
    let housekeeping = spawn_housekeeping(state.directory().clone(), &state.config);
    let (mut alice, _) = TestClient::register(&state, "alice");

    housekeeping.shutdown();
    tokio::time::sleep(Duration::from_secs(30)).await;
    settle().await;

    assert!(statuses(&mut alice).is_empty());
}
