use chrono::NaiveDate;

use crate::config::ScoringConfig;
use crate::engine::reward;
use crate::models::{DailyPerformance, PerformanceLabel, PrayerLog, PrayerStatus};

/// Quality weight of a status for the weighted score. Monotonic:
/// on_time >= delayed >= qadaa >= missed.
fn status_weight(status: PrayerStatus, config: &ScoringConfig) -> f64 {
    match status {
        PrayerStatus::OnTime => config.weight_on_time,
        PrayerStatus::Delayed => config.weight_delayed,
        PrayerStatus::Qadaa => config.weight_qadaa,
        PrayerStatus::Missed => 0.0,
    }
}

fn label_for(weighted_score: f64) -> PerformanceLabel {
    // Ordered threshold table, highest first.
    if weighted_score >= 80.0 {
        PerformanceLabel::Excellent
    } else if weighted_score >= 60.0 {
        PerformanceLabel::Good
    } else if weighted_score >= 40.0 {
        PerformanceLabel::Fair
    } else {
        PerformanceLabel::NeedsImprovement
    }
}

/// Aggregate a single day's logs (0..=5 of them) into a DailyPerformance.
///
/// `weighted_score` is the mean status weight over all five prayer slots,
/// unlogged slots counting zero. `points_percentage` normalizes against
/// the configured benchmark and is deliberately left unclamped: a day of
/// congregation prayers legitimately exceeds 100.
pub fn score_day(date: NaiveDate, logs: &[PrayerLog], config: &ScoringConfig) -> DailyPerformance {
    let logged_count = logs.len().min(5) as u8;

    let weight_sum: f64 = logs.iter().map(|l| status_weight(l.status, config)).sum();
    let weighted_score = weight_sum / 5.0 * 100.0;

    let daily_points: u32 = logs
        .iter()
        .map(|l| reward::points(l.status, l.jamaah, config))
        .sum();

    let points_percentage = if config.benchmark_max == 0 {
        0.0
    } else {
        daily_points as f64 / config.benchmark_max as f64 * 100.0
    };

    DailyPerformance {
        date,
        logged_count,
        weighted_score,
        daily_points,
        points_percentage,
        label: label_for(weighted_score),
    }
}
