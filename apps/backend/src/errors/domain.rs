//! Domain-level rejection type shared by the session directory and rooms.
//!
//! A `GameError` is never fatal: the dispatcher reports it to the requesting
//! connection as an `error` message and keeps the socket open. Requests that
//! are deliberately ignored (empty chat, duplicate answers or votes) return
//! `Ok(())` instead of an error.

use thiserror::Error;

use super::ErrorCode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("invalid or unknown identity token")]
    InvalidToken,
    #[error("display name {0:?} is already taken")]
    NameTaken(String),
    #[error("room {0:?} not found")]
    RoomNotFound(String),
    #[error("player is not in a room")]
    NotInRoom,
    #[error("player is already in a room")]
    AlreadyInRoom,
    #[error("player is not in a room and cannot leave")]
    NotInRoomToLeave,
    #[error("only the host may start the game")]
    NotHost,
    #[error("room is full")]
    RoomFull,
    #[error("a game is already in progress")]
    GameInProgress,
    #[error("room is not in the writing stage")]
    NotWritingStage,
    #[error("room is not in the voting stage")]
    NotVotingStage,
    #[error("internal error: {0}")]
    Internal(String),
}

impl GameError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GameError::InvalidToken => ErrorCode::InvalidToken,
            GameError::NameTaken(_) => ErrorCode::NameTaken,
            GameError::RoomNotFound(_) => ErrorCode::RoomNotFound,
            GameError::NotInRoom => ErrorCode::NotInRoom,
            GameError::AlreadyInRoom => ErrorCode::AlreadyInRoom,
            GameError::NotInRoomToLeave => ErrorCode::NotInRoomToLeave,
            GameError::NotHost => ErrorCode::NotHost,
            GameError::RoomFull => ErrorCode::RoomFull,
            GameError::GameInProgress => ErrorCode::GameInProgress,
            GameError::NotWritingStage => ErrorCode::NotWritingStage,
            GameError::NotVotingStage => ErrorCode::NotVotingStage,
            GameError::Internal(_) => ErrorCode::Internal,
        }
    }
}
