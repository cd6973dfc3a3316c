pub mod directory;
pub mod housekeeping;

pub use directory::SessionDirectory;
pub use housekeeping::{spawn_housekeeping, Housekeeping};
