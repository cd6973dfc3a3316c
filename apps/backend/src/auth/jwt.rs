use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::IdentityClaims;
use crate::domain::player::PlayerId;
use crate::state::security_config::SecurityConfig;
use crate::AppError;

/// Mint an identity token for a freshly registered player.
///
/// Identity tokens do not expire on their own: a player can only be
/// reclaimed while the directory still knows the embedded id, which is
/// bounded by the reconnect grace period.
pub fn mint_identity_token(
    name: &str,
    id: PlayerId,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AppError::internal("Failed to get current time"))?
        .as_secs() as i64;

    let claims = IdentityClaims {
        name: name.to_string(),
        id: id.to_string(),
        iat,
    };

    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode identity token: {e}")))
}

/// Verify an identity token and return its claims.
///
/// The algorithm is pinned to the configured one, so a token whose header
/// names anything else is rejected even if its signature would verify.
///
/// Errors:
/// - Invalid signature → `AppError::Unauthorized { reason: "invalid_signature" }`
/// - Algorithm mismatch → `...("invalid_algorithm")`
/// - Any other decode error → `...("invalid_token")`
pub fn verify_identity_token(
    token: &str,
    security: &SecurityConfig,
) -> Result<IdentityClaims, AppError> {
    let mut validation = Validation::new(security.algorithm);
    validation.required_spec_claims.clear();
    validation.validate_exp = false;

    decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => AppError::unauthorized("invalid_signature"),
        ErrorKind::InvalidAlgorithm => AppError::unauthorized("invalid_algorithm"),
        _ => AppError::unauthorized("invalid_token"),
    })
}
