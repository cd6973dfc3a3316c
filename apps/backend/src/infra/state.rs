use std::sync::Arc;

use crate::config::GameConfig;
use crate::domain::questions::QuestionBank;
use crate::error::AppError;
use crate::middleware::rate_limit::{InboundLimiter, MessageLimiter};
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    config: GameConfig,
    questions: Option<QuestionBank>,
    security_config: Option<SecurityConfig>,
    limiter: Option<Arc<dyn InboundLimiter>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            questions: None,
            security_config: None,
            limiter: None,
        }
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_questions(mut self, questions: QuestionBank) -> Self {
        self.questions = Some(questions);
        self
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = Some(security_config);
        self
    }

    /// Override the per-message limiter. Defaults to a [`MessageLimiter`]
    /// sized from the game config.
    pub fn with_limiter(mut self, limiter: Arc<dyn InboundLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn build(self) -> Result<AppState, AppError> {
        let questions = match self.questions {
            Some(questions) => questions,
            None => QuestionBank::embedded()?,
        };
        let security = self.security_config.unwrap_or_else(SecurityConfig::generate);
        let limiter = self
            .limiter
            .unwrap_or_else(|| Arc::new(MessageLimiter::from_config(&self.config)));
        AppState::new(self.config, questions, security, limiter)
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
