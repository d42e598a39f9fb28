pub mod settings;

pub use settings::{
    AppConfig, HeatmapConfig, LocationConfig, QiblaConfig, ScoringConfig, StreakConfig,
};
