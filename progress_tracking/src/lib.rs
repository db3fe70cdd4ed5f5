mod tracker;
mod units;

pub use tracker::{ProgressSnapshot, ProgressTracker, DEFAULT_REPORT_INTERVAL, PROGRESS_BAR_WIDTH};
pub use units::{format_duration, human_bytes};
