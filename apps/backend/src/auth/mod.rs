//! Identity tokens handed out at registration and redeemed on reconnect.

pub mod claims;
pub mod jwt;
