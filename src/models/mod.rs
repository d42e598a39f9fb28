pub mod habit;
pub mod performance;
pub mod prayer;
pub mod qibla;

pub use habit::{Habit, HabitCategory, HabitLevel, HabitLog};
pub use performance::{
    DailyPerformance, HeatmapDay, HeatmapWeek, Milestone, MilestoneKind, PerformanceLabel,
    PeriodStats, StreakInfo,
};
pub use prayer::{Jamaah, PrayerLog, PrayerStatus, PrayerType};
pub use qibla::{AccuracyTier, MagnetometerSample, Position, QiblaData};
