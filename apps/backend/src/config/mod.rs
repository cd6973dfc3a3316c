//! Runtime configuration: game tuning knobs and the server's CLI surface.

pub mod game;
pub mod server;

pub use game::GameConfig;
pub use server::{LogFormat, ServerArgs};
