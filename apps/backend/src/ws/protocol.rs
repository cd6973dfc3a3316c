//! Wire format of the game socket.
//!
//! Inbound frames are `{action, data}` envelopes; outbound frames are JSON
//! objects discriminated by `msgType`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::stage::Stage;
use crate::errors::ErrorCode;

/// Inbound action envelope. A frame that does not parse as one is a
/// protocol error and closes the connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientEnvelope {
    #[serde(alias = "Action")]
    pub action: String,
    #[serde(default, alias = "Data")]
    pub data: String,
}

impl ClientEnvelope {
    pub fn new(action: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAction {
    Register,
    Login,
    CreateRoom,
    JoinRoom,
    LeaveRoom,
    StartGame,
    SendAnswer,
    VoteAnswer,
    SendMessage,
}

impl FromStr for ClientAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "register" => Ok(Self::Register),
            "login" => Ok(Self::Login),
            "createRoom" => Ok(Self::CreateRoom),
            "joinRoom" => Ok(Self::JoinRoom),
            "leaveRoom" => Ok(Self::LeaveRoom),
            "startGame" => Ok(Self::StartGame),
            "sendAnswer" => Ok(Self::SendAnswer),
            "voteAnswer" => Ok(Self::VoteAnswer),
            "sendMessage" => Ok(Self::SendMessage),
            _ => Err(()),
        }
    }
}

/// A room member as every other member sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub name: String,
    pub score: u32,
    pub action_done: bool,
}

/// An answer as shown to voters; the author and tally stay server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerView {
    pub id: String,
    pub content: String,
}

/// Full room snapshot pushed after every room mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_name: String,
    /// Members ordered by join time; the first one is the host.
    pub players: Vec<PlayerView>,
    pub answers: Vec<AnswerView>,
    pub game_stage: Stage,
    pub question: String,
    pub winner: Option<PlayerView>,
    pub winner_answer: Option<AnswerView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "msgType", rename_all = "camelCase")]
pub enum ServerMsg {
    /// The receiving player's own view.
    #[serde(rename = "self", rename_all = "camelCase")]
    SelfState {
        name: String,
        /// Current room code, empty outside a room
        room: String,
        action_done: bool,
    },

    RoomState(RoomSnapshot),

    #[serde(rename_all = "camelCase")]
    Chat { author: String, chat_message: String },

    #[serde(rename_all = "camelCase")]
    Status {
        player_count: usize,
        room_count: usize,
    },

    #[serde(rename_all = "camelCase")]
    Error { error: String, error_code: u16 },

    /// Identity token issued after registration.
    Jwt { data: String },
}

impl ServerMsg {
    pub fn error(code: ErrorCode) -> Self {
        ServerMsg::Error {
            error: code.message().to_string(),
            error_code: code.as_u16(),
        }
    }

    pub fn chat(author: impl Into<String>, text: impl Into<String>) -> Self {
        ServerMsg::Chat {
            author: author.into(),
            chat_message: text.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServerMsg::SelfState { .. } => "self",
            ServerMsg::RoomState(_) => "roomState",
            ServerMsg::Chat { .. } => "chat",
            ServerMsg::Status { .. } => "status",
            ServerMsg::Error { .. } => "error",
            ServerMsg::Jwt { .. } => "jwt",
        }
    }
}
