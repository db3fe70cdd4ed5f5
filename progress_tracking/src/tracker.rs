use std::time::Duration;

use tokio::time::Instant;

/// Minimum wall-clock spacing between two granted progress reports.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(3);

/// Number of cells in the rendered progress bar.
pub const PROGRESS_BAR_WIDTH: usize = 20;

/// A rendered view of one progress sample. Formatting into a markup string
/// is the consumer's concern; this struct only carries the numbers.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressSnapshot {
    pub label: String,
    pub bar: String,
    pub percentage: f64,
    pub current_bytes: u64,
    pub total_bytes: u64,
    pub bytes_per_sec: f64,
    pub eta: Duration,
}

/// Rate-limited sampler for a single in-flight transfer.
///
/// One tracker is created per upload, sized to the file's byte length at
/// construction, and discarded when the upload finishes. The total is never
/// revised mid-transfer. `should_report` grants at most one report per
/// interval, except that a terminal sample (current == total) is always
/// granted so the final state is never dropped.
#[derive(Debug)]
pub struct ProgressTracker {
    label: String,
    total_bytes: u64,
    started_at: Instant,
    last_report_at: Option<Instant>,
    report_interval: Duration,
}

impl ProgressTracker {
    pub fn new(label: impl Into<String>, total_bytes: u64) -> Self {
        Self {
            label: label.into(),
            total_bytes,
            started_at: Instant::now(),
            last_report_at: None,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    pub fn with_report_interval(mut self, report_interval: Duration) -> Self {
        self.report_interval = report_interval;
        self
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Returns true when a report is due: at most once per interval, and
    /// unconditionally on the terminal sample. The last-report timestamp
    /// only advances when this grants a report, so it is monotonically
    /// non-decreasing.
    pub fn should_report(&mut self, current_bytes: u64) -> bool {
        let now = Instant::now();

        let due = match self.last_report_at {
            None => true,
            Some(last) => now.duration_since(last) >= self.report_interval,
        };

        if due || current_bytes == self.total_bytes {
            self.last_report_at = Some(now);
            true
        } else {
            false
        }
    }

    /// Computes a snapshot for the given byte count, or `None` when no
    /// meaningful speed can be derived yet (nothing sent, or no time has
    /// passed since the transfer started).
    pub fn render(&self, current_bytes: u64) -> Option<ProgressSnapshot> {
        let elapsed = self.started_at.elapsed();
        if elapsed.is_zero() || current_bytes == 0 {
            return None;
        }

        let bytes_per_sec = current_bytes as f64 / elapsed.as_secs_f64();
        let remaining = self.total_bytes.saturating_sub(current_bytes);
        let eta_secs = if bytes_per_sec > 0.0 {
            remaining as f64 / bytes_per_sec
        } else {
            0.0
        };

        let percentage = if self.total_bytes > 0 {
            (current_bytes as f64 / self.total_bytes as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        };

        let filled = ((percentage / 5.0).floor() as usize).min(PROGRESS_BAR_WIDTH);
        let bar = "█".repeat(filled) + &"░".repeat(PROGRESS_BAR_WIDTH - filled);

        Some(ProgressSnapshot {
            label: self.label.clone(),
            bar,
            percentage,
            current_bytes,
            total_bytes: self.total_bytes,
            bytes_per_sec,
            eta: Duration::from_secs_f64(eta_secs),
        })
    }

    /// Throttled sampling: a rendered snapshot when a report is due, `None`
    /// otherwise.
    pub fn sample(&mut self, current_bytes: u64) -> Option<ProgressSnapshot> {
        if self.should_report(current_bytes) {
            self.render(current_bytes)
        } else {
            None
        }
    }
}
