//! Player identity, connection binding and per-round flags.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::ws::connection::{ConnId, Connection};
use crate::ws::protocol::{PlayerView, ServerMsg};

/// Stable player identity. Survives reconnects and is embedded in the
/// identity token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for PlayerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Reconnect grace countdown owned by a disconnected player.
///
/// A single background task sleeps until the deadline held in a watch
/// channel. Extending only moves the deadline; the task notices after it
/// wakes and sleeps again, so there is never more than one task per player.
/// Dropping the timer aborts the task.
#[derive(Debug)]
pub struct GraceTimer {
    deadline: watch::Sender<Instant>,
    task: AbortHandle,
    epoch: u64,
}

impl GraceTimer {
    /// Arm a countdown that calls `on_expire` once the grace has elapsed
    /// without being cancelled.
    pub fn start<F>(grace: Duration, epoch: u64, on_expire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (deadline, mut watched) = watch::channel(Instant::now() + grace);
        let task = tokio::spawn(async move {
            loop {
                let target = *watched.borrow_and_update();
                tokio::time::sleep_until(target).await;
                if *watched.borrow() <= target {
                    break;
                }
            }
            on_expire();
        })
        .abort_handle();

        Self {
            deadline,
            task,
            epoch,
        }
    }

    /// Push the deadline to `grace` from now.
    pub fn extend(&self, grace: Duration) {
        self.deadline.send_replace(Instant::now() + grace);
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn cancel(self) {
        // Drop aborts.
    }
}

impl Drop for GraceTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Debug)]
struct PlayerState {
    connection: Option<Connection>,
    room: Option<String>,
    score: u32,
    action_done: bool,
    grace: Option<GraceTimer>,
}

/// A registered participant.
///
/// Mutable fields sit behind a per-player lock which is always the
/// innermost lock taken (after the directory and room locks).
#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    name: String,
    state: Mutex<PlayerState>,
}

impl Player {
    pub fn new(name: impl Into<String>, connection: Connection) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            state: Mutex::new(PlayerState {
                connection: Some(connection),
                room: None,
                score: 0,
                action_done: false,
                grace: None,
            }),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conn_id(&self) -> Option<ConnId> {
        self.state.lock().connection.as_ref().map(Connection::id)
    }

    /// Push a message to the bound connection, if any.
    pub fn send(&self, msg: ServerMsg) {
        let state = self.state.lock();
        match &state.connection {
            Some(connection) => connection.send(msg),
            None => debug!(player = %self.name, msg_type = msg.kind(), "dropping message for detached player"),
        }
    }

    /// Push the player's own view to the bound connection.
    pub fn send_self(&self) {
        let msg = {
            let state = self.state.lock();
            ServerMsg::SelfState {
                name: self.name.clone(),
                room: state.room.clone().unwrap_or_default(),
                action_done: state.action_done,
            }
        };
        self.send(msg);
    }

    pub fn view(&self) -> PlayerView {
        let state = self.state.lock();
        PlayerView {
            name: self.name.clone(),
            score: state.score,
            action_done: state.action_done,
        }
    }

    pub fn room(&self) -> Option<String> {
        self.state.lock().room.clone()
    }

    pub fn set_room(&self, room: Option<String>) {
        self.state.lock().room = room;
    }

    pub fn score(&self) -> u32 {
        self.state.lock().score
    }

    pub fn award_point(&self) -> u32 {
        let mut state = self.state.lock();
        state.score += 1;
        state.score
    }

    pub fn reset_score(&self) {
        self.state.lock().score = 0;
    }

    pub fn action_done(&self) -> bool {
        self.state.lock().action_done
    }

    pub fn set_action_done(&self, done: bool) {
        self.state.lock().action_done = done;
    }

    /// Replace the bound connection. Returns the previous binding.
    pub fn rebind(&self, connection: Option<Connection>) -> Option<Connection> {
        std::mem::replace(&mut self.state.lock().connection, connection)
    }

    /// Detach the connection if it is still `conn_id`.
    pub fn detach(&self, conn_id: ConnId) -> bool {
        let mut state = self.state.lock();
        if state.connection.as_ref().map(Connection::id) == Some(conn_id) {
            state.connection = None;
            true
        } else {
            false
        }
    }

    pub fn is_detached(&self) -> bool {
        self.state.lock().connection.is_none()
    }

    pub fn has_grace(&self) -> bool {
        self.state.lock().grace.is_some()
    }

    pub fn grace_epoch(&self) -> Option<u64> {
        self.state.lock().grace.as_ref().map(GraceTimer::epoch)
    }

    /// Extend the running grace timer. Returns false when none is running.
    pub fn extend_grace(&self, grace: Duration) -> bool {
        match &self.state.lock().grace {
            Some(timer) => {
                timer.extend(grace);
                true
            }
            None => false,
        }
    }

    pub fn set_grace(&self, timer: GraceTimer) {
        self.state.lock().grace = Some(timer);
    }

    pub fn take_grace(&self) -> Option<GraceTimer> {
        self.state.lock().grace.take()
    }
}
