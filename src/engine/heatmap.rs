use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeMap;

use crate::config::HeatmapConfig;
use crate::models::{HeatmapDay, HeatmapWeek};

/// Map a day's logged-prayer count onto the 0..=4 intensity scale using
/// the configured per-count table. Counts beyond 5 saturate at the top
/// level.
fn level_for(count: u8, config: &HeatmapConfig) -> u8 {
    config
        .levels
        .get(count as usize)
        .or(config.levels.last())
        .copied()
        .unwrap_or(0)
}

/// Bucket a sparse date -> count map into gap-free calendar weeks.
///
/// The window runs from the earliest to the latest observed date, with the
/// start snapped back to the preceding Monday so the first week is always
/// full. Dates absent from the input become count 0 / level 0 entries.
/// Weeks close on Sunday or at the end of the range; the final week may be
/// short and is padded only at display time (`HeatmapWeek::padded_cells`).
pub fn aggregate(counts: &BTreeMap<NaiveDate, u8>, config: &HeatmapConfig) -> Vec<HeatmapWeek> {
    let (Some(first), Some(last)) = (counts.keys().next(), counts.keys().next_back()) else {
        return Vec::new();
    };

    let start = *first - Duration::days(first.weekday().num_days_from_monday() as i64);
    let end = *last;

    let mut weeks = Vec::new();
    let mut week = Vec::with_capacity(7);
    let mut cursor = start;
    while cursor <= end {
        let count = counts.get(&cursor).copied().unwrap_or(0);
        week.push(HeatmapDay {
            date: cursor,
            count,
            level: level_for(count, config),
        });

        if cursor.weekday() == Weekday::Sun || cursor == end {
            weeks.push(HeatmapWeek {
                days: std::mem::take(&mut week),
            });
        }
        match cursor.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }
    weeks
}
