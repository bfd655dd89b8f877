//! Display helpers for cell text.

use chrono::{DateTime, Local};

/// ETA reported by the remote API for "never".
pub const ETA_INFINITE: i64 = 8_640_000;

const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

/// Human readable byte count using binary units.
///
/// Negative sizes (unknown) render as an empty string.
pub fn format_size(bytes: i64) -> String {
    if bytes < 0 {
        return String::new();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Transfer rate, e.g. `1.5 MiB/s`.
pub fn format_speed(bytes_per_sec: i64) -> String {
    format!("{}/s", format_size(bytes_per_sec.max(0)))
}

/// Remaining time, e.g. `3h 12m`. Unknown or very long ETAs render as `∞`.
pub fn format_eta(seconds: i64) -> String {
    if !(0..ETA_INFINITE).contains(&seconds) {
        return "∞".to_string();
    }
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    if minutes == 0 {
        "< 1m".to_string()
    } else if hours == 0 {
        format!("{}m", minutes)
    } else if days == 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if days < 100 {
        format!("{}d {}h", days, hours % 24)
    } else {
        "∞".to_string()
    }
}

/// Progress in `0.0..=1.0` as a percentage with one decimal.
pub fn format_percent(progress: f64) -> String {
    let percent = (progress * 100.0).clamp(0.0, 100.0);
    if percent >= 100.0 {
        "100%".to_string()
    } else {
        // Never round an unfinished torrent up to 100%.
        let tenths = (percent * 10.0).floor() / 10.0;
        format!("{:.1}%", tenths)
    }
}

/// Share ratio with two decimals. Negative or huge ratios render as `∞`.
pub fn format_ratio(ratio: f64) -> String {
    if !(0.0..10_000.0).contains(&ratio) {
        return "∞".to_string();
    }
    format!("{:.2}", ratio)
}

/// Local date and time for a unix timestamp. Unset timestamps render empty.
pub fn format_timestamp(unix: i64) -> String {
    if unix <= 0 {
        return String::new();
    }
    DateTime::from_timestamp(unix, 0)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
