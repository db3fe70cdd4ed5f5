use std::sync::Arc;
use std::time::Duration;

use bot_client::{FileKind, Transport};
use progress_tracking::{ProgressTracker, DEFAULT_REPORT_INTERVAL};
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::render;
use crate::status_reporter::StatusReporter;
use crate::task::{Outcome, TransferTask};

/// Drives one task through Initializing -> Transferring -> Completed|Failed.
///
/// A flood-control stall during the transfer is not a separate state; it is
/// a suspension inside Transferring, visible only as a gap between progress
/// reports.
pub struct UploadExecutor {
    transport: Arc<dyn Transport>,
    report_interval: Duration,
}

impl UploadExecutor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    pub fn with_report_interval(mut self, report_interval: Duration) -> Self {
        self.report_interval = report_interval;
        self
    }

    pub async fn execute(&self, task: &TransferTask) -> Outcome {
        // A missing file is a configuration error, not a transient one: fail
        // the task without touching the transport.
        let total_bytes = match tokio::fs::metadata(&task.path).await {
            Ok(m) if m.is_file() => m.len(),
            _ => {
                warn!(path = %task.path.display(), "file not found, skipping");
                return Outcome::failed(&task.path, format!("file not found: {}", task.path.display()));
            },
        };

        let file_name = task
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| task.path.display().to_string());

        let handle = match self
            .transport
            .send_message(&task.chat, &render::initializing_text(&file_name), task.topic)
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                error!(path = %task.path.display(), "could not create status message: {e}");
                return Outcome::failed(&task.path, e.to_string());
            },
        };

        let kind = FileKind::classify(&task.path, task.force_document);
        let caption = task
            .caption
            .clone()
            .unwrap_or_else(|| format!("<code>{file_name}</code>"));

        let tracker = ProgressTracker::new(format!("Uploading {file_name}"), total_bytes)
            .with_report_interval(self.report_interval);
        let reporter = Arc::new(StatusReporter::new(self.transport.clone(), handle, tracker));

        let started_at = Instant::now();
        let sent = self
            .transport
            .send_file(kind, &task.path, &caption, &task.chat, task.topic, reporter.clone())
            .await;

        match sent {
            Ok(()) => {
                let duration = started_at.elapsed();
                reporter
                    .edit_best_effort(&render::completed_text(&file_name, total_bytes, duration))
                    .await;

                // Only after the remote confirmed the send.
                if task.delete_on_success {
                    if let Err(e) = tokio::fs::remove_file(&task.path).await {
                        warn!(path = %task.path.display(), "uploaded file could not be deleted: {e}");
                    }
                }

                info!(path = %task.path.display(), bytes = total_bytes, secs = duration.as_secs(), "upload complete");
                Outcome::succeeded(&task.path)
            },
            Err(e) => {
                error!(path = %task.path.display(), "upload failed: {e}");
                reporter.edit_best_effort(&render::failed_text(&e.to_string())).await;
                Outcome::failed(&task.path, e.to_string())
            },
        }
    }
}
