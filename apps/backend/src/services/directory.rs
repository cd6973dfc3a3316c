//! Session directory: live connections, player identities and rooms.
//!
//! One directory exists per process. It owns every player and every room and
//! is the only place that creates or destroys them. Lock order is directory,
//! then room, then player; no lock is held across an await.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::auth::jwt::{mint_identity_token, verify_identity_token};
use crate::domain::player::{GraceTimer, Player, PlayerId};
use crate::domain::room::{Room, RoomRules};
use crate::errors::GameError;
use crate::state::security_config::SecurityConfig;
use crate::utils::room_code::generate_room_code;
use crate::ws::connection::{ConnId, Connection};
use crate::ws::protocol::ServerMsg;

#[derive(Default)]
struct DirectoryState {
    /// Connection to player. A dropped connection stays mapped until its
    /// player reconnects elsewhere or is evicted.
    by_conn: HashMap<ConnId, Arc<Player>>,
    by_id: HashMap<PlayerId, Arc<Player>>,
    rooms: HashMap<String, Arc<Room>>,
}

impl DirectoryState {
    fn unmap_player(&mut self, id: PlayerId) -> Option<Arc<Player>> {
        self.by_conn.retain(|_, p| p.id() != id);
        self.by_id.remove(&id)
    }

    fn name_taken(&self, name: &str) -> bool {
        self.by_id.values().any(|p| p.name() == name)
    }

    fn fresh_room_code(&self) -> String {
        loop {
            let code = generate_room_code();
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}

pub struct SessionDirectory {
    me: Weak<SessionDirectory>,
    rules: RoomRules,
    security: SecurityConfig,
    reconnect_grace: Duration,
    grace_epochs: AtomicU64,
    state: Mutex<DirectoryState>,
}

impl SessionDirectory {
    pub fn new(rules: RoomRules, security: SecurityConfig, reconnect_grace: Duration) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            rules,
            security,
            reconnect_grace,
            grace_epochs: AtomicU64::new(0),
            state: Mutex::new(DirectoryState::default()),
        })
    }

    /// Create a player for `connection` and return its identity token.
    ///
    /// A connection that already carries a player drops that player first.
    pub fn register(&self, connection: &Connection, name: &str) -> Result<String, GameError> {
        let mut state = self.state.lock();
        if state.name_taken(name) {
            return Err(GameError::NameTaken(name.to_string()));
        }
        if let Some(previous) = state.by_conn.get(&connection.id()).cloned() {
            info!(player = %previous.name(), conn_id = %connection.id(), "connection re-registered, dropping previous player");
            self.purge(&mut state, &previous);
        }

        let player = Arc::new(Player::new(name, connection.clone()));
        let token = mint_identity_token(name, player.id(), SystemTime::now(), &self.security)
            .map_err(|e| GameError::Internal(e.to_string()))?;

        state.by_conn.insert(connection.id(), player.clone());
        state.by_id.insert(player.id(), player.clone());
        info!(player = %name, player_id = %player.id(), conn_id = %connection.id(), "player registered");

        player.send_self();
        Ok(token)
    }

    /// Rebind the player named by `token` to `connection`.
    pub fn login(&self, connection: &Connection, token: &str) -> Result<Arc<Player>, GameError> {
        let mut state = self.state.lock();
        let player = verify_identity_token(token, &self.security)
            .ok()
            .and_then(|claims| claims.id.parse::<PlayerId>().ok())
            .and_then(|id| state.by_id.get(&id).cloned())
            .ok_or(GameError::InvalidToken)?;

        if let Some(other) = state.by_conn.get(&connection.id()).cloned() {
            if other.id() != player.id() {
                state.by_conn.remove(&connection.id());
                other.detach(connection.id());
                self.start_grace(&other);
            }
        }

        if let Some(grace) = player.take_grace() {
            grace.cancel();
        }
        state.by_conn.retain(|_, p| p.id() != player.id());
        state.by_conn.insert(connection.id(), player.clone());
        player.rebind(Some(connection.clone()));
        info!(player = %player.name(), conn_id = %connection.id(), "player rejoined");

        player.send_self();
        if let Some(room) = player.room().and_then(|name| state.rooms.get(&name).cloned()) {
            room.resend_state();
        }
        Ok(player)
    }

    /// Handle a dropped connection. The player is kept for the reconnect
    /// grace period; a second drop inside the window extends it.
    pub fn disconnect(&self, conn_id: ConnId) {
        let state = self.state.lock();
        let Some(player) = state.by_conn.get(&conn_id).cloned() else {
            debug!(%conn_id, "disconnect from unregistered connection");
            return;
        };
        player.detach(conn_id);
        info!(player = %player.name(), %conn_id, "player disconnected, waiting for reconnect");
        self.start_grace(&player);
    }

    fn start_grace(&self, player: &Arc<Player>) {
        if player.extend_grace(self.reconnect_grace) {
            debug!(player = %player.name(), "reconnect grace extended");
            return;
        }
        let epoch = self.grace_epochs.fetch_add(1, Ordering::Relaxed) + 1;
        let directory = self.me.clone();
        let id = player.id();
        player.set_grace(GraceTimer::start(self.reconnect_grace, epoch, move || {
            if let Some(directory) = directory.upgrade() {
                directory.evict(id, epoch);
            }
        }));
    }

    /// Remove a player whose grace period ran out. Does nothing if the
    /// player reconnected (or re-entered grace) after `epoch` was armed.
    fn evict(&self, id: PlayerId, epoch: u64) {
        let mut state = self.state.lock();
        let Some(player) = state.by_id.get(&id).cloned() else {
            return;
        };
        if player.grace_epoch() != Some(epoch) {
            debug!(player = %player.name(), epoch, "stale grace expiry ignored");
            return;
        }
        info!(player = %player.name(), player_id = %id, "player timed out");
        self.purge(&mut state, &player);
    }

    fn purge(&self, state: &mut DirectoryState, player: &Arc<Player>) {
        if let Some(room) = player.room().and_then(|name| state.rooms.get(&name).cloned()) {
            room.remove_player(player);
        }
        drop(player.take_grace());
        state.unmap_player(player.id());
    }

    /// Create a room and seat `player` in it as host.
    pub fn create_room(&self, player: &Arc<Player>) -> Result<Arc<Room>, GameError> {
        let mut state = self.state.lock();
        if player.room().is_some() {
            return Err(GameError::AlreadyInRoom);
        }
        let code = state.fresh_room_code();
        let room = Room::new(code.clone(), self.rules.clone());
        state.rooms.insert(code.clone(), room.clone());
        info!(room = %code, player = %player.name(), "room created");

        room.add_player(player)?;
        Ok(room)
    }

    pub fn join_room(&self, player: &Arc<Player>, name: &str) -> Result<Arc<Room>, GameError> {
        let state = self.state.lock();
        if player.room().is_some() {
            return Err(GameError::AlreadyInRoom);
        }
        let room = state
            .rooms
            .get(name)
            .cloned()
            .ok_or_else(|| GameError::RoomNotFound(name.to_string()))?;
        room.add_player(player)?;
        Ok(room)
    }

    pub fn leave_room(&self, player: &Arc<Player>) -> Result<(), GameError> {
        let state = self.state.lock();
        let name = player.room().ok_or(GameError::NotInRoomToLeave)?;
        match state.rooms.get(&name) {
            Some(room) => {
                room.remove_player(player);
            }
            None => {
                warn!(player = %player.name(), room = %name, "player linked to a missing room");
                player.set_room(None);
                player.send_self();
            }
        }
        Ok(())
    }

    /// The room the player is currently in.
    pub fn room_of(&self, player: &Player) -> Result<Arc<Room>, GameError> {
        let name = player.room().ok_or(GameError::NotInRoom)?;
        self.state
            .lock()
            .rooms
            .get(&name)
            .cloned()
            .ok_or(GameError::NotInRoom)
    }

    pub fn lookup_room(&self, name: &str) -> Result<Arc<Room>, GameError> {
        self.state
            .lock()
            .rooms
            .get(name)
            .cloned()
            .ok_or_else(|| GameError::RoomNotFound(name.to_string()))
    }

    pub fn lookup_player(&self, conn_id: ConnId) -> Option<Arc<Player>> {
        self.state.lock().by_conn.get(&conn_id).cloned()
    }

    pub fn player_by_id(&self, id: PlayerId) -> Option<Arc<Player>> {
        self.state.lock().by_id.get(&id).cloned()
    }

    /// Drop every room with no members. Returns how many were removed.
    pub fn reclaim_idle_rooms(&self) -> usize {
        let mut state = self.state.lock();
        let before = state.rooms.len();
        state.rooms.retain(|_, room| !room.is_empty());
        let removed = before - state.rooms.len();
        if removed > 0 {
            info!(removed, remaining = state.rooms.len(), "reclaimed idle rooms");
        }
        removed
    }

    /// Send every registered player the global counts.
    pub fn broadcast_status(&self) {
        let state = self.state.lock();
        let msg = ServerMsg::Status {
            player_count: state.by_id.len(),
            room_count: state.rooms.len(),
        };
        for player in state.by_id.values() {
            player.send(msg.clone());
        }
    }

    pub fn player_count(&self) -> usize {
        self.state.lock().by_id.len()
    }

    pub fn room_count(&self) -> usize {
        self.state.lock().rooms.len()
    }
}
