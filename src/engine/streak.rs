use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

use crate::models::StreakInfo;

/// A day qualifies toward a streak only at 100% completion: all five
/// prayers logged and all of them on time.
const QUALIFYING: f64 = 100.0;

fn qualifies(completion: &BTreeMap<NaiveDate, f64>, date: NaiveDate) -> bool {
    completion.get(&date).is_some_and(|p| *p >= QUALIFYING)
}

/// Compute current and longest consecutive-day runs from per-day
/// completion percentages. Days absent from the map are gaps and break a
/// run exactly like an incomplete day.
///
/// "Today in progress" policy: today is included only once it already sits
/// at 100%; otherwise the backward scan starts at yesterday, so a
/// partially logged today never breaks an ongoing streak.
pub fn compute(completion: &BTreeMap<NaiveDate, f64>, today: NaiveDate) -> StreakInfo {
    let anchor = if qualifies(completion, today) {
        today
    } else {
        today.pred_opt().unwrap_or(today)
    };

    let mut current = 0u32;
    let mut cursor = anchor;
    while qualifies(completion, cursor) {
        current += 1;
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }

    // Single forward scan for the longest run. Keys iterate in date order,
    // so a non-adjacent successor means at least one gap day in between.
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev_date: Option<NaiveDate> = None;
    for (date, pct) in completion {
        let adjacent = prev_date.and_then(|p| p.succ_opt()) == Some(*date);
        if *pct >= QUALIFYING {
            run = if adjacent { run + 1 } else { 1 };
        } else {
            run = 0;
        }
        longest = longest.max(run);
        prev_date = Some(*date);
    }

    StreakInfo {
        current,
        longest: longest.max(current),
        last_prayed_date: completion.keys().next_back().copied(),
    }
}

/// Pure lookup: does this streak length land exactly on a configured
/// milestone boundary?
pub fn milestone_reached(current: u32, milestones: &[u32]) -> Option<u32> {
    milestones.iter().copied().find(|m| *m == current)
}

/// The calendar day on which the current run crossed `threshold` days.
/// `current` is the run length [`compute`] reported for `today`; the run
/// ends at today when today already qualifies and at yesterday otherwise,
/// so a backfilled log never mislabels the crossing with the log's date.
pub fn threshold_date(
    completion: &BTreeMap<NaiveDate, f64>,
    today: NaiveDate,
    current: u32,
    threshold: u32,
) -> Option<NaiveDate> {
    if threshold == 0 || current < threshold {
        return None;
    }
    let run_end = if qualifies(completion, today) {
        today
    } else {
        today.pred_opt()?
    };
    Some(run_end - Duration::days((current - threshold) as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn series(entries: &[(u32, f64)]) -> BTreeMap<NaiveDate, f64> {
        entries.iter().map(|(day, p)| (d(*day), *p)).collect()
    }

    #[test]
    fn empty_history_has_no_streak() {
        let info = compute(&BTreeMap::new(), d(15));
        assert_eq!(info.current, 0);
        assert_eq!(info.longest, 0);
        assert_eq!(info.last_prayed_date, None);
    }

    #[test]
    fn unbroken_run_counts_back_from_yesterday() {
        let completion = series(&[(10, 100.0), (11, 100.0), (12, 100.0), (13, 100.0)]);
        let info = compute(&completion, d(14));
        assert_eq!(info.current, 4);
        assert_eq!(info.longest, 4);
        assert_eq!(info.last_prayed_date, Some(d(13)));
    }

    #[test]
    fn incomplete_day_breaks_current_streak() {
        // 7 perfect days, then one at 80%
        let mut completion = series(&[
            (1, 100.0),
            (2, 100.0),
            (3, 100.0),
            (4, 100.0),
            (5, 100.0),
            (6, 100.0),
            (7, 100.0),
        ]);
        completion.insert(d(8), 80.0);
        let info = compute(&completion, d(9));
        assert_eq!(info.current, 0);
        assert!(info.longest >= 7);
    }

    #[test]
    fn gap_breaks_identically_to_incomplete_day() {
        // days 1-3 perfect, day 4 missing entirely, days 5-6 perfect
        let completion = series(&[(1, 100.0), (2, 100.0), (3, 100.0), (5, 100.0), (6, 100.0)]);
        let info = compute(&completion, d(7));
        assert_eq!(info.current, 2);
        assert_eq!(info.longest, 3);
    }

    #[test]
    fn partial_today_does_not_break_streak() {
        let mut completion = series(&[(10, 100.0), (11, 100.0)]);
        // today has 3 of 5 so far
        completion.insert(d(12), 60.0);
        let info = compute(&completion, d(12));
        assert_eq!(info.current, 2);
    }

    #[test]
    fn perfect_today_extends_streak() {
        let completion = series(&[(10, 100.0), (11, 100.0), (12, 100.0)]);
        let info = compute(&completion, d(12));
        assert_eq!(info.current, 3);
    }

    #[test]
    fn threshold_date_is_the_day_the_run_crossed() {
        // run covers days 4..=10; as of day 11 the current streak is 7
        let completion = series(&[
            (4, 100.0),
            (5, 100.0),
            (6, 100.0),
            (7, 100.0),
            (8, 100.0),
            (9, 100.0),
            (10, 100.0),
        ]);
        let info = compute(&completion, d(11));
        assert_eq!(info.current, 7);
        assert_eq!(threshold_date(&completion, d(11), info.current, 7), Some(d(10)));

        // a longer run crossed the boundary further back
        assert_eq!(threshold_date(&completion, d(11), 7, 5), Some(d(8)));
        // below the boundary there is no crossing
        assert_eq!(threshold_date(&completion, d(11), 6, 7), None);
    }

    #[test]
    fn backfilled_log_dates_crossing_at_run_end_not_log_date() {
        // days 5..=11 all complete, today included; backfilling day 5
        // last completes the run, but the crossing day is today
        let completion = series(&[
            (5, 100.0),
            (6, 100.0),
            (7, 100.0),
            (8, 100.0),
            (9, 100.0),
            (10, 100.0),
            (11, 100.0),
        ]);
        let info = compute(&completion, d(11));
        assert_eq!(info.current, 7);
        assert_eq!(threshold_date(&completion, d(11), info.current, 7), Some(d(11)));
    }

    #[test]
    fn milestone_is_exact_boundary_lookup() {
        let milestones = [7, 30, 100];
        assert_eq!(milestone_reached(7, &milestones), Some(7));
        assert_eq!(milestone_reached(30, &milestones), Some(30));
        assert_eq!(milestone_reached(8, &milestones), None);
        assert_eq!(milestone_reached(0, &milestones), None);
    }
}
