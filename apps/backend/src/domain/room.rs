//! Room state machine: membership, round stages and phase timers.
//!
//! Stages cycle `Waiting → Writing → Voting → Winner → (Writing | Waiting)`.
//! Writing and Voting are bounded by a deadline; each armed phase spawns one
//! waiter task that races the deadline against an early-completion signal.
//! The waiter carries the phase sequence number it was armed with and
//! re-checks it (and the stage) under the room lock, so at most one
//! transition fires per phase no matter which side wins the race.

use std::collections::HashSet;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use rand::seq::SliceRandom;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::domain::player::{Player, PlayerId};
use crate::domain::questions::QuestionBank;
use crate::domain::stage::{pick_winner, Answer, Stage};
use crate::errors::GameError;
use crate::ws::protocol::{RoomSnapshot, ServerMsg};

/// Author of join/leave announcements.
pub const SERVER_AUTHOR: &str = "Server";

/// Per-room limits, fixed at creation.
#[derive(Debug, Clone)]
pub struct RoomRules {
    pub max_players: usize,
    pub max_score: u32,
    pub phase_deadline: Duration,
    pub questions: Arc<QuestionBank>,
}

impl RoomRules {
    pub fn from_config(config: &GameConfig, questions: Arc<QuestionBank>) -> Self {
        Self {
            max_players: config.max_players,
            max_score: config.max_score,
            phase_deadline: config.phase_deadline(),
            questions,
        }
    }
}

/// How a timed phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseEnd {
    Deadline,
    AllDone,
}

#[derive(Debug)]
struct Member {
    join_seq: u64,
    player: Arc<Player>,
}

/// The currently armed phase. Replacing `done` drops the old sender, which
/// releases a waiter that is still parked on it.
#[derive(Debug, Default)]
struct PhaseSlot {
    seq: u64,
    done: Option<oneshot::Sender<()>>,
}

#[derive(Debug, Default)]
struct RoomState {
    stage: Stage,
    /// Kept in join order.
    members: Vec<Member>,
    next_join_seq: u64,
    answers: Vec<Answer>,
    /// Who has voted in the current phase, members or not.
    voters: HashSet<PlayerId>,
    question: String,
    winner: Option<Arc<Player>>,
    winner_answer: Option<Answer>,
    phase: PhaseSlot,
}

impl RoomState {
    fn member(&self, id: PlayerId) -> Option<&Arc<Player>> {
        self.members
            .iter()
            .find(|m| m.player.id() == id)
            .map(|m| &m.player)
    }

    fn players(&self) -> impl Iterator<Item = &Arc<Player>> {
        self.members.iter().map(|m| &m.player)
    }

    fn host(&self) -> Option<PlayerId> {
        self.members
            .iter()
            .min_by_key(|m| m.join_seq)
            .map(|m| m.player.id())
    }

    /// Whether `id` already answered or voted in the running phase.
    fn has_acted(&self, id: PlayerId) -> bool {
        match self.stage {
            Stage::Writing => self.answers.iter().any(|a| a.author == id),
            Stage::Voting => self.voters.contains(&id),
            Stage::Waiting | Stage::Winner => false,
        }
    }
}

#[derive(Debug)]
pub struct Room {
    name: String,
    rules: RoomRules,
    state: Mutex<RoomState>,
}

impl Room {
    pub fn new(name: impl Into<String>, rules: RoomRules) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            rules,
            state: Mutex::new(RoomState::default()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> Stage {
        self.state.lock().stage
    }

    pub fn member_count(&self) -> usize {
        self.state.lock().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().members.is_empty()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.state.lock().member(id).is_some()
    }

    /// Longest-tenured current member.
    pub fn host(&self) -> Option<PlayerId> {
        self.state.lock().host()
    }

    pub fn question(&self) -> String {
        self.state.lock().question.clone()
    }

    pub fn answer_count(&self) -> usize {
        self.state.lock().answers.len()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        self.snapshot_of(&self.state.lock())
    }

    /// Admit a player. Joining mid-round is allowed; the newcomer simply
    /// has nothing to submit until the next phase.
    pub fn add_player(&self, player: &Arc<Player>) -> Result<(), GameError> {
        let mut state = self.state.lock();
        if state.member(player.id()).is_some() {
            return Err(GameError::AlreadyInRoom);
        }
        if state.members.len() >= self.rules.max_players {
            return Err(GameError::RoomFull);
        }

        state.next_join_seq += 1;
        let join_seq = state.next_join_seq;
        state.members.push(Member {
            join_seq,
            player: player.clone(),
        });
        player.set_room(Some(self.name.clone()));
        player.set_action_done(state.has_acted(player.id()));

        info!(room = %self.name, player = %player.name(), members = state.members.len(), "player joined room");
        self.broadcast(
            &state,
            ServerMsg::chat(SERVER_AUTHOR, format!("Player {} has joined", player.name())),
        );
        self.broadcast_state(&state);
        player.send_self();
        Ok(())
    }

    /// Drop a member. Answers and votes already cast stay where they are.
    pub fn remove_player(&self, player: &Player) -> bool {
        let mut state = self.state.lock();
        let Some(index) = state.members.iter().position(|m| m.player.id() == player.id()) else {
            return false;
        };
        state.members.remove(index);
        player.set_room(None);
        player.set_action_done(false);

        info!(room = %self.name, player = %player.name(), members = state.members.len(), "player left room");
        self.broadcast(
            &state,
            ServerMsg::chat(SERVER_AUTHOR, format!("Player {} has left", player.name())),
        );
        self.broadcast_state(&state);
        player.send_self();
        true
    }

    /// Host-only. A room with fewer than two members ignores the request.
    pub fn start(self: &Arc<Self>, player_id: PlayerId) -> Result<(), GameError> {
        let mut state = self.state.lock();
        if state.stage != Stage::Waiting {
            return Err(GameError::GameInProgress);
        }
        if state.host() != Some(player_id) {
            return Err(GameError::NotHost);
        }
        if state.members.len() < 2 {
            debug!(room = %self.name, "start ignored: not enough players");
            return Ok(());
        }
        self.begin_writing(&mut state);
        Ok(())
    }

    pub fn submit_answer(&self, player: &Arc<Player>, text: &str) -> Result<(), GameError> {
        let mut state = self.state.lock();
        if state.stage != Stage::Writing {
            return Err(GameError::NotWritingStage);
        }
        if state.member(player.id()).is_none() {
            return Err(GameError::NotInRoom);
        }
        if text.trim().is_empty() {
            return Ok(());
        }
        if state.answers.iter().any(|a| a.author == player.id()) {
            debug!(room = %self.name, player = %player.name(), "duplicate answer ignored");
            return Ok(());
        }

        state.answers.push(Answer::new(text, player.id()));
        player.set_action_done(true);
        self.broadcast_state(&state);
        player.send_self();

        if state.answers.len() == state.members.len() {
            debug!(room = %self.name, "all players finished writing");
            Self::signal_done(&mut state);
        }
        Ok(())
    }

    /// Count a vote. An unknown answer id leaves the voter free to vote again.
    pub fn cast_vote(&self, player: &Arc<Player>, answer_id: &str) -> Result<(), GameError> {
        let mut state = self.state.lock();
        if state.stage != Stage::Voting {
            return Err(GameError::NotVotingStage);
        }
        if state.member(player.id()).is_none() {
            return Err(GameError::NotInRoom);
        }
        if state.voters.contains(&player.id()) {
            debug!(room = %self.name, player = %player.name(), "duplicate vote ignored");
            return Ok(());
        }

        if let Some(answer) = state.answers.iter_mut().find(|a| a.id == answer_id) {
            answer.votes += 1;
            state.voters.insert(player.id());
            player.set_action_done(true);
        }
        self.broadcast_state(&state);
        player.send_self();

        if state.players().all(|p| p.action_done()) {
            debug!(room = %self.name, "all players finished voting");
            Self::signal_done(&mut state);
        }
        Ok(())
    }

    pub fn chat(&self, player: &Player, text: &str) -> Result<(), GameError> {
        let state = self.state.lock();
        if state.member(player.id()).is_none() {
            return Err(GameError::NotInRoom);
        }
        if text.trim().is_empty() {
            return Ok(());
        }
        self.broadcast(&state, ServerMsg::chat(player.name(), text));
        self.broadcast_state(&state);
        Ok(())
    }

    /// Push the full state to every member.
    pub fn resend_state(&self) {
        self.broadcast_state(&self.state.lock());
    }

    fn begin_writing(self: &Arc<Self>, state: &mut RoomState) {
        Self::clear_action_flags(state);
        state.answers.clear();
        state.winner = None;
        state.winner_answer = None;
        state.question = self.rules.questions.draw().to_string();
        state.stage = Stage::Writing;
        self.arm_phase(state, Stage::Writing);

        info!(room = %self.name, stage = Stage::Writing.as_str(), "stage transition");
        self.broadcast_state(state);
    }

    /// Start a deadline for `stage` and spawn its waiter.
    fn arm_phase(self: &Arc<Self>, state: &mut RoomState, stage: Stage) {
        let (done, signalled) = oneshot::channel();
        state.phase.seq += 1;
        state.phase.done = Some(done);
        state.voters.clear();

        let seq = state.phase.seq;
        let deadline = self.rules.phase_deadline;
        let room = Arc::downgrade(self);
        tokio::spawn(Self::await_phase_end(room, seq, stage, deadline, signalled));
    }

    async fn await_phase_end(
        room: Weak<Room>,
        seq: u64,
        stage: Stage,
        deadline: Duration,
        signalled: oneshot::Receiver<()>,
    ) {
        let reason = tokio::select! {
            _ = tokio::time::sleep(deadline) => PhaseEnd::Deadline,
            signal = signalled => match signal {
                Ok(()) => PhaseEnd::AllDone,
                // Superseded by a newer phase.
                Err(_) => return,
            },
        };
        if let Some(room) = room.upgrade() {
            room.finish_phase(seq, stage, reason);
        }
    }

    fn finish_phase(self: &Arc<Self>, seq: u64, stage: Stage, reason: PhaseEnd) {
        let mut state = self.state.lock();
        if state.phase.seq != seq || state.stage != stage {
            debug!(room = %self.name, seq, stage = stage.as_str(), "stale phase end ignored");
            return;
        }
        debug!(room = %self.name, stage = stage.as_str(), ?reason, "phase ended");
        state.phase.done = None;
        Self::clear_action_flags(&mut state);

        match stage {
            Stage::Writing => self.end_writing(&mut state),
            Stage::Voting => self.end_voting(&mut state),
            Stage::Waiting | Stage::Winner => {}
        }
    }

    fn end_writing(self: &Arc<Self>, state: &mut RoomState) {
        match state.answers.len() {
            0 => {
                state.stage = Stage::Waiting;
                info!(room = %self.name, stage = Stage::Waiting.as_str(), "no answers, round abandoned");
                self.broadcast_state(state);
            }
            1 => {
                let answer = state.answers[0].clone();
                info!(room = %self.name, "single answer, technical win");
                self.declare_winner(state, answer);
            }
            _ => {
                state.answers.shuffle(&mut rand::rng());
                state.stage = Stage::Voting;
                self.arm_phase(state, Stage::Voting);
                info!(room = %self.name, stage = Stage::Voting.as_str(), "stage transition");
                self.broadcast_state(state);
            }
        }
    }

    fn end_voting(self: &Arc<Self>, state: &mut RoomState) {
        match pick_winner(&state.answers).cloned() {
            Some(answer) => self.declare_winner(state, answer),
            None => {
                state.stage = Stage::Waiting;
                self.broadcast_state(state);
            }
        }
    }

    fn declare_winner(self: &Arc<Self>, state: &mut RoomState, answer: Answer) {
        let winner = state.member(answer.author).cloned();
        match &winner {
            Some(player) => {
                let score = player.award_point();
                info!(room = %self.name, player = %player.name(), score, "round won");
            }
            None => info!(room = %self.name, "round winner already left"),
        }
        state.winner = winner;
        state.winner_answer = Some(answer);
        state.stage = Stage::Winner;
        self.broadcast_state(state);
        self.schedule_follow_up(state);
    }

    /// Leave the Winner stage right away, on a fresh task.
    fn schedule_follow_up(self: &Arc<Self>, state: &mut RoomState) {
        state.phase.seq += 1;
        state.phase.done = None;
        let seq = state.phase.seq;
        let room = Arc::downgrade(self);
        tokio::spawn(async move {
            if let Some(room) = room.upgrade() {
                room.after_winner(seq);
            }
        });
    }

    fn after_winner(self: &Arc<Self>, seq: u64) {
        let mut state = self.state.lock();
        if state.phase.seq != seq || state.stage != Stage::Winner {
            return;
        }
        Self::clear_action_flags(&mut state);

        let max_score = self.rules.max_score;
        if state.players().any(|p| p.score() >= max_score) {
            state.stage = Stage::Waiting;
            state.winner = None;
            state.winner_answer = None;
            state.answers.clear();
            for player in state.players() {
                player.reset_score();
            }
            info!(room = %self.name, max_score, "match over");
            self.broadcast_state(&state);
            return;
        }
        self.begin_writing(&mut state);
    }

    fn clear_action_flags(state: &mut RoomState) {
        for player in state.players() {
            player.set_action_done(false);
            player.send_self();
        }
    }

    /// Wake the phase waiter. Taking the sender makes repeats no-ops.
    fn signal_done(state: &mut RoomState) {
        if let Some(done) = state.phase.done.take() {
            let _ = done.send(());
        }
    }

    fn snapshot_of(&self, state: &RoomState) -> RoomSnapshot {
        RoomSnapshot {
            room_name: self.name.clone(),
            players: state.players().map(|p| p.view()).collect(),
            answers: state.answers.iter().map(Answer::view).collect(),
            game_stage: state.stage,
            question: state.question.clone(),
            winner: state.winner.as_ref().map(|p| p.view()),
            winner_answer: state.winner_answer.as_ref().map(Answer::view),
        }
    }

    fn broadcast_state(&self, state: &RoomState) {
        self.broadcast(state, ServerMsg::RoomState(self.snapshot_of(state)));
    }

    fn broadcast(&self, state: &RoomState, msg: ServerMsg) {
        for member in &state.members {
            member.player.send(msg.clone());
        }
    }
}
