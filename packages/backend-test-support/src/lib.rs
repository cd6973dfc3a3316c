//! Shared helpers for backend integration tests.
//!
//! Provides the unified tracing bootstrap used by every test binary and a
//! couple of generators for collision-free test data.

pub mod test_logging;
pub mod unique_helpers;
