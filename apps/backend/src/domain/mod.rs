//! Game domain: players, rooms and the round state machine.

pub mod player;
pub mod questions;
pub mod room;
pub mod stage;

pub use player::{Player, PlayerId};
pub use questions::QuestionBank;
pub use room::{Room, RoomRules};
pub use stage::{Answer, AnswerId, Stage};
