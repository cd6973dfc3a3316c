//! Round stages and answers.

use serde::{Serialize, Serializer};
use ulid::Ulid;

use crate::domain::player::PlayerId;
use crate::ws::protocol::AnswerView;

/// Room stage. Serialized as its integer discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Stage {
    #[default]
    Waiting = 0,
    Writing = 1,
    Voting = 2,
    Winner = 3,
}

impl Stage {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Waiting => "waiting",
            Stage::Writing => "writing",
            Stage::Voting => "voting",
            Stage::Winner => "winner",
        }
    }
}

impl Serialize for Stage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

pub type AnswerId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub id: AnswerId,
    pub content: String,
    pub author: PlayerId,
    pub votes: u32,
}

impl Answer {
    pub fn new(content: impl Into<String>, author: PlayerId) -> Self {
        Self {
            id: Ulid::new().to_string(),
            content: content.into(),
            author,
            votes: 0,
        }
    }

    pub fn view(&self) -> AnswerView {
        AnswerView {
            id: self.id.clone(),
            content: self.content.clone(),
        }
    }
}

/// The answer with the strictly highest vote count. Ties go to the one
/// encountered first.
pub fn pick_winner(answers: &[Answer]) -> Option<&Answer> {
    answers.iter().fold(None, |best: Option<&Answer>, answer| match best {
        Some(current) if current.votes >= answer.votes => Some(current),
        _ => Some(answer),
    })
}
