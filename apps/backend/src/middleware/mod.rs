pub mod access_log;
pub mod rate_limit;

pub use access_log::AccessLog;
pub use rate_limit::{InboundLimiter, MessageLimiter};
