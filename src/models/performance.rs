use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Qualitative label for a day's weighted score, picked from an ordered
/// threshold table (highest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLabel {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl PerformanceLabel {
    pub fn display_name(&self) -> &'static str {
        match self {
            PerformanceLabel::Excellent => "Excellent",
            PerformanceLabel::Good => "Good",
            PerformanceLabel::Fair => "Fair",
            PerformanceLabel::NeedsImprovement => "Needs Improvement",
        }
    }

    /// Color tag consumed by the presentation layer.
    pub fn color_tag(&self) -> &'static str {
        match self {
            PerformanceLabel::Excellent => "green",
            PerformanceLabel::Good => "teal",
            PerformanceLabel::Fair => "amber",
            PerformanceLabel::NeedsImprovement => "red",
        }
    }
}

/// Same-day aggregate derived from up to five prayer logs. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPerformance {
    pub date: NaiveDate,
    pub logged_count: u8,
    /// Quality-weighted score in [0, 100].
    pub weighted_score: f64,
    pub daily_points: u32,
    /// daily_points relative to the benchmark maximum. Congregation
    /// multiplies points 27x, so this may exceed 100.
    pub points_percentage: f64,
    pub label: PerformanceLabel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreakInfo {
    pub current: u32,
    pub longest: u32,
    pub last_prayed_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    /// Prayers logged that day, 0..=5.
    pub count: u8,
    /// Intensity bucket, 0..=4.
    pub level: u8,
}

/// One calendar week of heatmap days. The final week of a range may hold
/// fewer than 7 days; `padded_cells` fills the tail for display only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapWeek {
    pub days: Vec<HeatmapDay>,
}

impl HeatmapWeek {
    /// Always exactly 7 slots; trailing slots with no data are `None`.
    pub fn padded_cells(&self) -> [Option<HeatmapDay>; 7] {
        let mut cells = [None; 7];
        for (i, day) in self.days.iter().take(7).enumerate() {
            cells[i] = Some(*day);
        }
        cells
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodStats {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Days in the period times five.
    pub total_prayers: u32,
    pub prayers_logged: u32,
    pub completion_percentage: f64,
    pub on_time_percentage: f64,
    pub jamaah_percentage: f64,
    pub best_day: Option<NaiveDate>,
    /// Only surfaced when the worst day is below 100% completion.
    pub worst_day: Option<NaiveDate>,
    /// Logs per day rounded to the nearest whole log. Monthly only.
    pub daily_average: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    StreakSeven,
    StreakThirty,
    StreakHundred,
    TierUpgrade,
    CategoryComplete,
}

impl MilestoneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneKind::StreakSeven => "streak_7",
            MilestoneKind::StreakThirty => "streak_30",
            MilestoneKind::StreakHundred => "streak_100",
            MilestoneKind::TierUpgrade => "tier_upgrade",
            MilestoneKind::CategoryComplete => "category_complete",
        }
    }

    pub fn from_streak_threshold(threshold: u32) -> Option<MilestoneKind> {
        match threshold {
            7 => Some(MilestoneKind::StreakSeven),
            30 => Some(MilestoneKind::StreakThirty),
            100 => Some(MilestoneKind::StreakHundred),
            _ => None,
        }
    }
}

/// A crossing event. Recording is keyed on (subject_id, kind,
/// threshold_date) so re-evaluating the same history never duplicates one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Milestone {
    pub subject_id: String,
    pub kind: MilestoneKind,
    pub threshold_date: NaiveDate,
}
