use std::sync::Arc;

use bot_client::{BotClientError, MessageHandle, ProgressSink, Transport};
use progress_tracking::ProgressTracker;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::render;

/// Bundles the editable status message with its throttled tracker, so the
/// transport drives progress through one typed callback object instead of
/// loose closure captures.
///
/// Status edits are best-effort UI: a flood-control rejection sleeps out the
/// signaled wait and retries the edit once; any other edit failure is
/// discarded. Neither may ever abort the underlying transfer.
pub struct StatusReporter {
    transport: Arc<dyn Transport>,
    handle: MessageHandle,
    tracker: Mutex<ProgressTracker>,
}

impl StatusReporter {
    pub fn new(transport: Arc<dyn Transport>, handle: MessageHandle, tracker: ProgressTracker) -> Self {
        Self {
            transport,
            handle,
            tracker: Mutex::new(tracker),
        }
    }

    pub async fn edit_best_effort(&self, text: &str) {
        match self.transport.edit_message(&self.handle, text).await {
            Ok(()) => {},
            Err(BotClientError::RateLimited { retry_after }) => {
                warn!(wait_secs = retry_after.as_secs(), "status edit flood-controlled, backing off");
                tokio::time::sleep(retry_after).await;

                if let Err(e) = self.transport.edit_message(&self.handle, text).await {
                    debug!("status edit failed after backoff: {e}");
                }
            },
            Err(e) => debug!("status edit failed: {e}"),
        }
    }
}

#[async_trait::async_trait]
impl ProgressSink for StatusReporter {
    async fn on_progress(&self, current_bytes: u64, _total_bytes: u64) {
        let snapshot = self.tracker.lock().await.sample(current_bytes);

        if let Some(snapshot) = snapshot {
            self.edit_best_effort(&render::progress_text(&snapshot)).await;
        }
    }
}
