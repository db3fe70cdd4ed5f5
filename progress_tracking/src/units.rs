/// Units for byte formatting, base 1024.
const BYTE_UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// Formats a byte count with the largest base-1024 unit that keeps the
/// magnitude at or above 1, rounded to two decimal places. Sizes of a
/// tebibyte or more stay in TiB with an unbounded magnitude.
pub fn human_bytes(size: u64) -> String {
    if size == 0 {
        return "0 B".to_owned();
    }

    let mut scaled = size as f64;
    let mut unit = 0;
    while scaled >= 1024.0 && unit + 1 < BYTE_UNITS.len() {
        scaled /= 1024.0;
        unit += 1;
    }

    let rounded = (scaled * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded} {}", BYTE_UNITS[unit])
    } else {
        let s = format!("{rounded:.2}");
        format!("{} {}", s.trim_end_matches('0').trim_end_matches('.'), BYTE_UNITS[unit])
    }
}

/// Formats a duration in whole seconds as HH:MM:SS. Hours are unbounded;
/// negative inputs collapse to "00:00:00".
pub fn format_duration(seconds: i64) -> String {
    if seconds < 0 {
        return "00:00:00".to_owned();
    }

    let (minutes, secs) = (seconds / 60, seconds % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    format!("{hours:02}:{minutes:02}:{secs:02}")
}
