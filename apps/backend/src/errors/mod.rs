//! Domain rejections and the stable codes they are reported with.

pub mod domain;
pub mod error_code;

pub use domain::GameError;
pub use error_code::ErrorCode;
