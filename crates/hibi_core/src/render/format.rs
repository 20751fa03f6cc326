//! Pure date and duration formatting.

use chrono::{Datelike, FixedOffset, TimeZone};

const WEEKDAY_KANJI: [char; 7] = ['日', '月', '火', '水', '木', '金', '土'];

/// Formats epoch milliseconds as `YYYY/MM/DD(曜)` in the given offset.
///
/// Returns `None` for timestamps chrono cannot represent.
pub fn format_date(epoch_ms: i64, offset: &FixedOffset) -> Option<String> {
    let local = offset.timestamp_millis_opt(epoch_ms).single()?;
    let weekday = WEEKDAY_KANJI[local.weekday().num_days_from_sunday() as usize];
    Some(format!("{}({weekday})", local.format("%Y/%m/%d")))
}

/// Formats epoch milliseconds as `HH:MM` in the given offset.
pub fn format_clock_time(epoch_ms: i64, offset: &FixedOffset) -> Option<String> {
    let local = offset.timestamp_millis_opt(epoch_ms).single()?;
    Some(local.format("%H:%M").to_string())
}

/// Formats an elapsed duration as `MM:SS`, or `H:MM:SS` from one hour up.
/// Negative durations clamp to zero; sub-second remainders are dropped.
pub fn format_duration(duration_ms: i64) -> String {
    let total_secs = duration_ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
