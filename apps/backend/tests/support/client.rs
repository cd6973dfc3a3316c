// In-process game client: a connection handle plus the outbox the server
// writes to, driven through the same dispatcher the socket session uses.

use std::time::Duration;

use fgame::domain::stage::Stage;
use fgame::state::app_state::AppState;
use fgame::ws::connection::{Connection, Outbound};
use fgame::ws::dispatch::dispatch;
use fgame::ws::protocol::{ClientEnvelope, RoomSnapshot, ServerMsg};

pub struct TestClient {
    pub connection: Connection,
    outbound: Outbound,
}

impl TestClient {
    pub fn new() -> Self {
        let (connection, outbound) = Connection::channel();
        Self {
            connection,
            outbound,
        }
    }

    /// Register under `name`, discard the greeting, and return the token.
    pub fn register(state: &AppState, name: &str) -> (Self, String) {
        let mut client = Self::new();
        client.act(state, "register", name);
        let token = client
            .drain()
            .into_iter()
            .find_map(|msg| match msg {
                ServerMsg::Jwt { data } => Some(data),
                _ => None,
            })
            .expect("register should issue a token");
        (client, token)
    }

    pub fn act(&self, state: &AppState, action: &str, data: &str) {
        dispatch(state, &self.connection, ClientEnvelope::new(action, data));
    }

    /// Everything received so far.
    pub fn drain(&mut self) -> Vec<ServerMsg> {
        std::iter::from_fn(|| self.outbound.try_recv().ok()).collect()
    }

    pub fn error_codes(&mut self) -> Vec<u16> {
        self.drain()
            .into_iter()
            .filter_map(|msg| match msg {
                ServerMsg::Error { error_code, .. } => Some(error_code),
                _ => None,
            })
            .collect()
    }

    pub fn room_states(&mut self) -> Vec<RoomSnapshot> {
        self.drain()
            .into_iter()
            .filter_map(|msg| match msg {
                ServerMsg::RoomState(snapshot) => Some(snapshot),
                _ => None,
            })
            .collect()
    }

    pub fn last_room_state(&mut self) -> Option<RoomSnapshot> {
        self.room_states().pop()
    }

    pub fn chats(&mut self) -> Vec<(String, String)> {
        self.drain()
            .into_iter()
            .filter_map(|msg| match msg {
                ServerMsg::Chat {
                    author,
                    chat_message,
                } => Some((author, chat_message)),
                _ => None,
            })
            .collect()
    }

    /// Most recent `self` message as `(room, action_done)`.
    pub fn last_self(&mut self) -> Option<(String, bool)> {
        self.drain().into_iter().rev().find_map(|msg| match msg {
            ServerMsg::SelfState {
                room, action_done, ..
            } => Some((room, action_done)),
            _ => None,
        })
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Let spawned phase and follow-up tasks run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Register `names` and seat them all in one room created by the first.
/// Returns the clients (host first) and the room code. Outboxes are drained.
pub fn seat_players(state: &AppState, names: &[&str]) -> (Vec<TestClient>, String) {
    let mut clients: Vec<TestClient> = names
        .iter()
        .map(|name| TestClient::register(state, name).0)
        .collect();

    clients[0].act(state, "createRoom", "");
    let room = clients[0]
        .last_room_state()
        .expect("creator receives room state")
        .room_name;

    for client in clients.iter().skip(1) {
        client.act(state, "joinRoom", &room);
    }
    for client in clients.iter_mut() {
        client.drain();
    }
    (clients, room)
}

/// Start a round from the host and drain everyone's outbox.
pub fn start_round(state: &AppState, clients: &mut [TestClient]) {
    clients[0].act(state, "startGame", "");
    for client in clients.iter_mut() {
        client.drain();
    }
}

pub fn stage_of(state: &AppState, room: &str) -> Stage {
    state
        .directory()
        .lookup_room(room)
        .expect("room exists")
        .stage()
}
