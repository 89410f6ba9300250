// ABOUTME: Background last-used updates dispatched after successful validation
// ABOUTME: Fire-and-forget tasks tracked so callers and tests can await them deterministically

use tokio_util::task::TaskTracker;
use tracing::debug;

use tokenkeep_storage::SharedDriver;

/// Dispatches `touch_last_used` off the validation path.
///
/// Failures (for example a token revoked between validate and touch) are
/// logged at debug level and dropped. No ordering exists between touches of
/// the same token; the last write wins.
#[derive(Debug, Clone, Default)]
pub struct TouchScheduler {
    tracker: TaskTracker,
}

impl TouchScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the update on the current tokio runtime and return immediately
    pub fn schedule(&self, driver: SharedDriver, id: i64) {
        self.tracker.spawn(async move {
            if let Err(e) = driver.touch_last_used(id).await {
                debug!("Ignoring last-used update failure for token {}: {}", id, e);
            }
        });
    }

    /// Number of touches still in flight
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every touch scheduled so far has finished
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
