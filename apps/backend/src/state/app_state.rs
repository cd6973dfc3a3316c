use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use crate::auth::jwt::{mint_identity_token, verify_identity_token};
use crate::config::GameConfig;
use crate::domain::player::PlayerId;
use crate::domain::questions::QuestionBank;
use crate::domain::room::RoomRules;
use crate::error::AppError;
use crate::middleware::rate_limit::InboundLimiter;
use crate::services::directory::SessionDirectory;

use super::security_config::SecurityConfig;

/// Application state shared by every socket session and route.
///
/// Built once at startup; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Identity token signing settings
    pub security: SecurityConfig,
    pub config: GameConfig,
    directory: Arc<SessionDirectory>,
    limiter: Arc<dyn InboundLimiter>,
}

impl AppState {
    /// Validate the configuration, check that identity tokens round-trip,
    /// and create the session directory.
    pub fn new(
        config: GameConfig,
        questions: QuestionBank,
        security: SecurityConfig,
        limiter: Arc<dyn InboundLimiter>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        token_self_test(&security)?;

        let rules = RoomRules::from_config(&config, Arc::new(questions));
        let directory = SessionDirectory::new(rules, security.clone(), config.reconnect_grace);
        Ok(Self {
            security,
            config,
            directory,
            limiter,
        })
    }

    pub fn directory(&self) -> &Arc<SessionDirectory> {
        &self.directory
    }

    pub fn limiter(&self) -> &Arc<dyn InboundLimiter> {
        &self.limiter
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("players", &self.directory.player_count())
            .field("rooms", &self.directory.room_count())
            .finish_non_exhaustive()
    }
}

/// Signing is not recoverable at runtime, so a broken key stops startup.
fn token_self_test(security: &SecurityConfig) -> Result<(), AppError> {
    let id = PlayerId::new();
    let token = mint_identity_token("self-test", id, SystemTime::now(), security)?;
    let claims = verify_identity_token(&token, security)
        .map_err(|e| AppError::internal(format!("identity token self-test failed: {e}")))?;
    if claims.id != id.to_string() {
        return Err(AppError::internal("identity token self-test returned wrong id"));
    }
    Ok(())
}
