//! Rate limiting for the game socket.
//!
//! Two layers, both on `actix-extensible-rate-limit`'s fixed-window
//! in-memory backend:
//! - The `/ws` upgrade route is wrapped by the crate's middleware, keyed by
//!   real client IP.
//! - Every inbound frame on an open socket is checked against
//!   [`MessageLimiter`]: `burst` messages per source address per window.
//!   Exhausted means the frame is dropped without a reply.

use std::time::Duration;

use actix_extensible_rate_limit::backend::memory::{self, InMemoryBackend};
use actix_extensible_rate_limit::backend::{Backend, SimpleInput, SimpleInputFunctionBuilder};
use futures_util::FutureExt;
use tracing::warn;

use crate::config::GameConfig;

/// Upgrade requests allowed per source address per minute.
pub const UPGRADE_REQUESTS_PER_MINUTE: u64 = 20;

/// Configuration for websocket upgrade rate limiting.
/// Limits: 20 requests per 60 seconds per IP address.
pub fn upgrade_rate_limit_config() -> SimpleInputFunctionBuilder {
    SimpleInputFunctionBuilder::new(Duration::from_secs(60), UPGRADE_REQUESTS_PER_MINUTE)
        .real_ip_key()
}

/// Per-message admission check consulted by socket sessions.
pub trait InboundLimiter: Send + Sync {
    /// Consume one token for `source`. False means drop the message.
    fn allow(&self, source: &str) -> bool;
}

#[derive(Clone)]
pub struct MessageLimiter {
    burst: u64,
    window: Duration,
    backend: InMemoryBackend,
}

impl MessageLimiter {
    /// Limiter without background collection of expired buckets. Safe to
    /// build outside an actix runtime.
    pub fn new(burst: u32, window: Duration) -> Self {
        Self::with_backend(burst, window, InMemoryBackend::builder().with_gc_interval(None))
    }

    /// Limiter whose expired buckets are collected every `gc_interval`.
    /// Must be built inside an actix runtime.
    pub fn collected(burst: u32, window: Duration, gc_interval: Duration) -> Self {
        Self::with_backend(
            burst,
            window,
            InMemoryBackend::builder().with_gc_interval(Some(gc_interval)),
        )
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.message_burst, config.message_window)
    }

    fn with_backend(
        burst: u32,
        window: Duration,
        backend: memory::Builder,
    ) -> Self {
        Self {
            burst: u64::from(burst),
            window,
            backend: backend.build(),
        }
    }
}

impl InboundLimiter for MessageLimiter {
    fn allow(&self, source: &str) -> bool {
        let input = SimpleInput {
            interval: self.window,
            max_requests: self.burst,
            key: source.to_string(),
        };
        // The in-memory backend answers without suspending.
        match self.backend.request(input).now_or_never() {
            Some(Ok((decision, _, _))) => {
                if decision.is_denied() {
                    warn!(source, "address hit rate limit");
                }
                decision.is_allowed()
            }
            Some(Err(never)) => match never {},
            None => {
                warn!(source, "rate limit backend did not answer, admitting message");
                true
            }
        }
    }
}

/// Limiter that admits everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

impl InboundLimiter for Unlimited {
    fn allow(&self, _source: &str) -> bool {
        true
    }
}
