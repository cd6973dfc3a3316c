use jsonwebtoken::Algorithm;
use rand::RngCore;

/// Length of the per-process signing secret, in bytes.
const GENERATED_SECRET_LEN: usize = 64;

/// Configuration for identity token signing.
///
/// The secret lives for the whole process: tokens minted before a restart
/// are meaningless afterwards, since no player survives one anyway.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Secret key for signing and verifying tokens
    pub jwt_secret: Vec<u8>,
    /// JWT algorithm to use (defaults to HS256)
    pub algorithm: Algorithm,
}

impl SecurityConfig {
    /// Create a new SecurityConfig with the given secret
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
        }
    }

    /// Create a SecurityConfig with a fresh random secret from the OS RNG.
    pub fn generate() -> Self {
        let mut secret = vec![0u8; GENERATED_SECRET_LEN];
        rand::rng().fill_bytes(&mut secret);
        Self::new(secret)
    }
}
