/// Format a percentage, trimming trailing zeros
pub fn format_percent(pct: f64) -> String {
    if pct == pct.floor() {
        format!("{}%", pct as i64)
    } else {
        format!("{:.1}%", pct)
    }
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Glyph for a heatmap intensity level 0..=4
pub fn level_glyph(level: u8) -> &'static str {
    match level {
        0 => "·",
        1 => "░",
        2 => "▒",
        3 => "▓",
        _ => "█",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_trims_whole_numbers() {
        assert_eq!(format_percent(40.0), "40%");
        assert_eq!(format_percent(66.666), "66.7%");
    }

    #[test]
    fn bar_handles_zero_total() {
        assert_eq!(progress_bar(0, 0, 4), "░░░░");
        assert_eq!(progress_bar(2, 4, 4), "██░░");
    }
}
