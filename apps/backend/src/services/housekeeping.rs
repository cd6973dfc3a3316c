//! Process-wide periodic tasks: status fan-out and idle-room reclamation.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::services::directory::SessionDirectory;

/// Handles to the periodic tasks. Dropping them aborts the tasks.
pub struct Housekeeping {
    status: JoinHandle<()>,
    sweep: JoinHandle<()>,
}

impl Housekeeping {
    pub fn shutdown(self) {}
}

impl Drop for Housekeeping {
    fn drop(&mut self) {
        self.status.abort();
        self.sweep.abort();
    }
}

/// Start the status broadcaster and the room sweeper. The first run of
/// each happens one full period after start.
pub fn spawn_housekeeping(directory: Arc<SessionDirectory>, config: &GameConfig) -> Housekeeping {
    info!(
        status_interval_secs = config.status_interval.as_secs(),
        gc_interval_secs = config.gc_interval.as_secs(),
        "housekeeping started"
    );

    let status = tokio::spawn(status_loop(directory.clone(), config.status_interval));
    let sweep = tokio::spawn(sweep_loop(directory, config.gc_interval));
    Housekeeping { status, sweep }
}

async fn status_loop(directory: Arc<SessionDirectory>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        directory.broadcast_status();
    }
}

async fn sweep_loop(directory: Arc<SessionDirectory>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let removed = directory.reclaim_idle_rooms();
        debug!(removed, "room sweep finished");
    }
}
