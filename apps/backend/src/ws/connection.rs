//! Connection handles shared between socket sessions and the game core.
//!
//! The game core never touches a socket. Each session owns the receiving
//! half of an unbounded channel and forwards whatever arrives to its client;
//! the core holds the sending half inside a [`Connection`]. Pushing into the
//! channel never blocks, so rooms can broadcast while holding their lock.

use std::fmt;

use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::ws::protocol::ServerMsg;

pub type Outbound = mpsc::UnboundedReceiver<ServerMsg>;

/// Identity of one live socket (not of the player behind it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(Uuid);

impl ConnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnId,
    outbox: mpsc::UnboundedSender<ServerMsg>,
}

impl Connection {
    /// Create a connection handle and the receiver its session drains.
    pub fn channel() -> (Self, Outbound) {
        let (outbox, outbound) = mpsc::unbounded_channel();
        (
            Self {
                id: ConnId::new(),
                outbox,
            },
            outbound,
        )
    }

    pub fn id(&self) -> ConnId {
        self.id
    }

    /// Best-effort send. A closed session is logged and otherwise ignored;
    /// the disconnect path cleans up after it.
    pub fn send(&self, msg: ServerMsg) {
        let kind = msg.kind();
        if self.outbox.send(msg).is_err() {
            warn!(conn_id = %self.id, msg_type = kind, "send failed: connection closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.outbox.is_closed()
    }
}
