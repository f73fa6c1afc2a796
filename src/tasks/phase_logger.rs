//! Phase change logging background task

use tokio::sync::watch;
use tracing::{debug, info};

use crate::state::{Phase, TimerSnapshot};

/// Log every phase transition seen on the snapshot channel.
///
/// Returns the last observed phase once the engine is dropped.
pub async fn phase_logger_task(mut updates: watch::Receiver<TimerSnapshot>) -> Phase {
    let mut phase = updates.borrow_and_update().phase;
    info!("Starting phase logger task (timer is {})", phase);

    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update().clone();
        if snapshot.phase != phase {
            info!("Timer {} -> {} at {}", phase, snapshot.phase, snapshot.display);
            phase = snapshot.phase;
        } else {
            debug!("Timer {} at {}", snapshot.phase, snapshot.display);
        }
    }

    debug!("Snapshot channel closed, phase logger exiting");
    phase
}
