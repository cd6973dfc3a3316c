//! Tuning knobs for rooms, rounds and the session directory.

use std::time::Duration;

use crate::error::AppError;

/// Base length of a writing or voting phase before the multiplier applies.
pub const BASE_PHASE_DURATION: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Member cap per room
    pub max_players: usize,
    /// Score that ends a match
    pub max_score: u32,
    /// Phase length before scaling
    pub phase_duration: Duration,
    /// Scales `phase_duration` into the effective deadline
    pub timeout_multiplier: u32,
    /// How long a dropped player may reclaim their identity
    pub reconnect_grace: Duration,
    /// Period of the idle-room sweep
    pub gc_interval: Duration,
    /// Period of the status fan-out
    pub status_interval: Duration,
    /// Inbound messages allowed per source address per window
    pub message_burst: u32,
    pub message_window: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_players: 10,
            max_score: 10,
            phase_duration: BASE_PHASE_DURATION,
            timeout_multiplier: 1,
            reconnect_grace: Duration::from_secs(10),
            gc_interval: Duration::from_secs(60),
            status_interval: Duration::from_secs(10),
            message_burst: 30,
            message_window: Duration::from_secs(60),
        }
    }
}

impl GameConfig {
    /// Effective deadline of a writing or voting phase.
    pub fn phase_deadline(&self) -> Duration {
        self.phase_duration * self.timeout_multiplier
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_players < 2 {
            return Err(AppError::config(format!(
                "max_players must be at least 2, got {}",
                self.max_players
            )));
        }
        if self.max_score == 0 {
            return Err(AppError::config("max_score must be positive"));
        }
        if self.timeout_multiplier == 0 || self.phase_duration.is_zero() {
            return Err(AppError::config("phase deadline must be positive"));
        }
        if self.message_burst == 0 {
            return Err(AppError::config("message_burst must be positive"));
        }
        Ok(())
    }
}
