//! Status-message markup. The tracker produces numbers; this module turns
//! them into the HTML texts posted to the status message.

use std::time::Duration;

use progress_tracking::{format_duration, human_bytes, ProgressSnapshot};

pub fn initializing_text(file_name: &str) -> String {
    format!("<code>Initializing upload for {file_name}...</code>")
}

pub fn progress_text(snapshot: &ProgressSnapshot) -> String {
    format!(
        "<b>{}</b>\n<code>[{}] {:.2}%</code>\n📦 <b>Size:</b> {} / {}\n🚀 <b>Speed:</b> {}/s\n⏳ <b>ETA:</b> {}",
        snapshot.label,
        snapshot.bar,
        snapshot.percentage,
        human_bytes(snapshot.current_bytes),
        human_bytes(snapshot.total_bytes),
        human_bytes(snapshot.bytes_per_sec as u64),
        format_duration(snapshot.eta.as_secs() as i64),
    )
}

pub fn completed_text(file_name: &str, total_bytes: u64, duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    let avg_speed = if secs > 0.0 { (total_bytes as f64 / secs) as u64 } else { 0 };

    format!(
        "✅ <b>Upload Complete!</b>\n📄 <b>File:</b> <code>{file_name}</code>\n📊 <b>Size:</b> {}\n⏱️ <b>Time:</b> {}s\n🚀 <b>Avg Speed:</b> {}/s",
        human_bytes(total_bytes),
        duration.as_secs(),
        human_bytes(avg_speed),
    )
}

pub fn failed_text(error: &str) -> String {
    format!("❌ <b>Upload Failed!</b>\nError: <code>{error}</code>")
}
