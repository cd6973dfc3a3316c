//! Error codes sent to clients in `error` messages.
//!
//! Codes are stable identifiers that clients switch on. Add new codes here;
//! never send ad-hoc numbers. The tens digit groups them: 1x identity,
//! 2x room membership, 3x game stage, 5x server faults.

use core::fmt;

/// Centralized client-facing error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Identity
    /// Reconnect token failed verification or names an unknown player
    InvalidToken,
    /// Another registered player already uses the display name
    NameTaken,

    // Room membership
    /// No room with the requested code
    RoomNotFound,
    /// Game action sent by a player outside any room
    NotInRoom,
    /// Create/join sent by a player already in a room
    AlreadyInRoom,
    /// Leave sent by a player outside any room
    NotInRoomToLeave,
    /// Start requested by someone other than the host
    NotHost,
    /// Room is at its member cap
    RoomFull,

    // Game stage
    /// Start requested while a round is running
    GameInProgress,
    /// Answer sent outside the writing stage
    NotWritingStage,
    /// Vote sent outside the voting stage
    NotVotingStage,

    /// Internal server error
    Internal,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 12] = [
        Self::InvalidToken,
        Self::NameTaken,
        Self::RoomNotFound,
        Self::NotInRoom,
        Self::AlreadyInRoom,
        Self::NotInRoomToLeave,
        Self::NotHost,
        Self::RoomFull,
        Self::GameInProgress,
        Self::NotWritingStage,
        Self::NotVotingStage,
        Self::Internal,
    ];

    /// Numeric code placed in the `errorCode` field.
    pub const fn as_u16(&self) -> u16 {
        match self {
            Self::InvalidToken => 10,
            Self::NameTaken => 11,
            Self::RoomNotFound => 20,
            Self::NotInRoom => 21,
            Self::AlreadyInRoom => 22,
            Self::NotInRoomToLeave => 23,
            Self::NotHost => 24,
            Self::RoomFull => 25,
            Self::GameInProgress => 30,
            Self::NotWritingStage => 31,
            Self::NotVotingStage => 32,
            Self::Internal => 50,
        }
    }

    /// Human-readable text placed in the `error` field.
    pub const fn message(&self) -> &'static str {
        match self {
            Self::InvalidToken => "Invalid jwt",
            Self::NameTaken => "Name already taken",
            Self::RoomNotFound => "Room not found",
            Self::NotInRoom => "Player not in room",
            Self::AlreadyInRoom => "Player already in a room",
            Self::NotInRoomToLeave => "Player not in a room",
            Self::NotHost => "Only host is allowed to start games",
            Self::RoomFull => "Room is full",
            Self::GameInProgress => "Game in progress",
            Self::NotWritingStage => "Not writing stage",
            Self::NotVotingStage => "Not voting stage",
            Self::Internal => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.as_u16())
    }
}
