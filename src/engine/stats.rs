use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::models::{PeriodStats, PrayerLog};

/// Summarize a period of prayer logs. `daily_average` is only filled for
/// monthly summaries.
///
/// Percentage denominators of zero yield 0, never NaN: a period with no
/// logs reports 0% on-time, and a period with no on-time prayers reports
/// 0% jamaah.
pub fn period_stats(
    start: NaiveDate,
    end: NaiveDate,
    logs: &[PrayerLog],
    monthly: bool,
) -> PeriodStats {
    let days = (end - start).num_days().max(0) as u32 + 1;
    let total_prayers = days * 5;

    let in_range: Vec<&PrayerLog> = logs
        .iter()
        .filter(|l| l.date >= start && l.date <= end)
        .collect();

    let logged = in_range.len() as u32;
    let on_time = in_range.iter().filter(|l| l.counts_on_time()).count() as u32;
    let in_jamaah = in_range
        .iter()
        .filter(|l| l.counts_on_time() && l.in_congregation())
        .count() as u32;

    let completion_percentage = logged as f64 / total_prayers as f64 * 100.0;
    let on_time_percentage = if logged == 0 {
        0.0
    } else {
        on_time as f64 / logged as f64 * 100.0
    };
    let jamaah_percentage = if on_time == 0 {
        0.0
    } else {
        in_jamaah as f64 / on_time as f64 * 100.0
    };

    // Per-day completion over every calendar day in the period; days with
    // no logs sit at 0%.
    let mut per_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    let mut cursor = start;
    while cursor <= end {
        per_day.insert(cursor, 0);
        match cursor.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }
    for log in &in_range {
        if let Some(count) = per_day.get_mut(&log.date) {
            *count += 1;
        }
    }

    // no logs means no day is "best"
    let best_day = if logged == 0 {
        None
    } else {
        per_day
            .iter()
            .max_by_key(|&(date, count)| (*count, std::cmp::Reverse(*date)))
            .map(|(date, _)| *date)
    };
    let worst = per_day
        .iter()
        .min_by_key(|&(date, count)| (*count, *date))
        .map(|(date, count)| (*date, *count));
    // the worst day is only worth surfacing when it is actually below 100%
    let worst_day = worst.and_then(|(date, count)| if count < 5 { Some(date) } else { None });

    let daily_average = monthly.then(|| (logged as f64 / days as f64).round() as u32);

    PeriodStats {
        period_start: start,
        period_end: end,
        total_prayers,
        prayers_logged: logged,
        completion_percentage,
        on_time_percentage,
        jamaah_percentage,
        best_day,
        worst_day,
        daily_average,
    }
}
