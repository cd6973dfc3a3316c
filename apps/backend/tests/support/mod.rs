#![allow(dead_code)]

pub mod client;
pub mod websocket;
pub mod websocket_client;

// Re-export only what current tests actually import
pub use client::{seat_players, settle, stage_of, start_round, TestClient};
pub use state::{test_config, test_state, test_state_with, test_state_with_limiter};
