//! Time formatting helpers.

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3_599 => format!("{}m {}s", secs / 60, secs % 60),
        3_600..=86_399 => format!("{}h {}m", secs / 3_600, (secs % 3_600) / 60),
        _ => format!("{}d {}h", secs / 86_400, (secs % 86_400) / 3_600),
    }
}

/// Format how far through a cycle we are, e.g. `"250/1000s (25%)"`.
pub fn format_cycle_progress(elapsed: u64, cycle_duration: u64) -> String {
    if cycle_duration == 0 {
        return format!("{elapsed}/0s");
    }
    let pct = (elapsed as u128 * 100 / cycle_duration as u128) as u64;
    format!("{elapsed}/{cycle_duration}s ({pct}%)")
}
