//! Command-line flags for the `fgame` binary.
//!
//! Every flag can also be set through an `FGAME_*` environment variable,
//! which is how container deployments configure the server.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::game::GameConfig;
use crate::domain::questions::QuestionBank;
use crate::error::AppError;

/// Output format of the process log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable, for local runs
    Pretty,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "fgame", about = "Real-time party game server")]
pub struct ServerArgs {
    /// HTTP service address
    #[arg(long, env = "FGAME_ADDR", default_value = "localhost:8080")]
    pub addr: String,

    /// Maximum number of players in a room
    #[arg(long, alias = "maxPlayers", env = "FGAME_MAX_PLAYERS", default_value_t = 10)]
    pub max_players: usize,

    /// Score that ends a match
    #[arg(long, alias = "maxScore", env = "FGAME_MAX_SCORE", default_value_t = 10)]
    pub max_score: u32,

    /// Multiplier applied to the 30s phase deadline
    #[arg(
        long,
        alias = "timeoutMultiplier",
        env = "FGAME_TIMEOUT_MULTIPLIER",
        default_value_t = 1
    )]
    pub timeout_multiplier: u32,

    /// Question corpus, one prompt per line (defaults to the built-in list)
    #[arg(long, env = "FGAME_QUESTIONS")]
    pub questions: Option<PathBuf>,

    #[arg(long, env = "FGAME_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

impl ServerArgs {
    pub fn game_config(&self) -> Result<GameConfig, AppError> {
        let config = GameConfig {
            max_players: self.max_players,
            max_score: self.max_score,
            timeout_multiplier: self.timeout_multiplier,
            ..GameConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn question_bank(&self) -> Result<QuestionBank, AppError> {
        match &self.questions {
            Some(path) => QuestionBank::load(path),
            None => QuestionBank::embedded(),
        }
    }
}
