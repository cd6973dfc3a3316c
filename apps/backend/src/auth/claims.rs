//! Claims carried by identity tokens.

use serde::{Deserialize, Serialize};

/// Claims embedded in the token a player receives after registering.
///
/// The token is the only thing a client needs to reclaim its identity after
/// a dropped connection; `id` is resolved against the session directory.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Display name at registration time
    pub name: String,
    /// Player identifier
    pub id: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
}
