use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_base_on_time() -> u32 {
    10
}
fn default_points_delayed() -> u32 {
    5
}
fn default_points_qadaa() -> u32 {
    3
}
fn default_points_missed() -> u32 {
    0
}
fn default_jamaah_multiplier() -> u32 {
    27
}
fn default_benchmark_max() -> u32 {
    50
}
fn default_weight_on_time() -> f64 {
    1.0
}
fn default_weight_delayed() -> f64 {
    0.7
}
fn default_weight_qadaa() -> f64 {
    0.5
}
fn default_milestones() -> Vec<u32> {
    vec![7, 30, 100]
}
fn default_heatmap_levels() -> Vec<u8> {
    // count -> level for counts 0..=5
    vec![0, 1, 2, 3, 3, 4]
}
fn default_kaaba_latitude() -> f64 {
    21.4225
}
fn default_kaaba_longitude() -> f64 {
    39.8262
}
fn default_accuracy_high_m() -> f64 {
    10.0
}
fn default_accuracy_medium_m() -> f64 {
    50.0
}
fn default_latitude() -> f64 {
    33.6938
}
fn default_longitude() -> f64 {
    73.0651
}
fn default_location_name() -> String {
    "Islamabad".to_string()
}
fn default_location_accuracy_m() -> f64 {
    25.0
}
fn default_hijri_offset() -> i32 {
    0
}

/// Point values and weights injected into the scoring engine. Values are
/// configuration, not derived; the weight table must stay monotonic
/// (on_time >= delayed >= qadaa >= missed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_base_on_time")]
    pub base_on_time: u32,
    #[serde(default = "default_points_delayed")]
    pub points_delayed: u32,
    #[serde(default = "default_points_qadaa")]
    pub points_qadaa: u32,
    #[serde(default = "default_points_missed")]
    pub points_missed: u32,
    #[serde(default = "default_jamaah_multiplier")]
    pub jamaah_multiplier: u32,
    /// Nominal full-day points used to normalize the points percentage.
    /// The percentage is not clamped, so congregation days exceed 100.
    #[serde(default = "default_benchmark_max")]
    pub benchmark_max: u32,
    #[serde(default = "default_weight_on_time")]
    pub weight_on_time: f64,
    #[serde(default = "default_weight_delayed")]
    pub weight_delayed: f64,
    #[serde(default = "default_weight_qadaa")]
    pub weight_qadaa: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_on_time: default_base_on_time(),
            points_delayed: default_points_delayed(),
            points_qadaa: default_points_qadaa(),
            points_missed: default_points_missed(),
            jamaah_multiplier: default_jamaah_multiplier(),
            benchmark_max: default_benchmark_max(),
            weight_on_time: default_weight_on_time(),
            weight_delayed: default_weight_delayed(),
            weight_qadaa: default_weight_qadaa(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Streak day counts that trigger a milestone, ascending.
    #[serde(default = "default_milestones")]
    pub milestones: Vec<u32>,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            milestones: default_milestones(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapConfig {
    /// Intensity level for each count 0..=5. Must be monotonic so the
    /// legend stays meaningful.
    #[serde(default = "default_heatmap_levels")]
    pub levels: Vec<u8>,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            levels: default_heatmap_levels(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QiblaConfig {
    #[serde(default = "default_kaaba_latitude")]
    pub kaaba_latitude: f64,
    #[serde(default = "default_kaaba_longitude")]
    pub kaaba_longitude: f64,
    #[serde(default = "default_accuracy_high_m")]
    pub accuracy_high_m: f64,
    #[serde(default = "default_accuracy_medium_m")]
    pub accuracy_medium_m: f64,
}

impl Default for QiblaConfig {
    fn default() -> Self {
        Self {
            kaaba_latitude: default_kaaba_latitude(),
            kaaba_longitude: default_kaaba_longitude(),
            accuracy_high_m: default_accuracy_high_m(),
            accuracy_medium_m: default_accuracy_medium_m(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_location_name")]
    pub location_name: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// Assumed horizontal accuracy of the configured coordinate.
    #[serde(default = "default_location_accuracy_m")]
    pub accuracy_m: f64,
    /// Days to add/subtract from the Hijri date for local moon sighting.
    /// 0 = default (Saudi), -1 = one day behind, +1 = one day ahead
    #[serde(default = "default_hijri_offset")]
    pub hijri_offset: i32,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            location_name: default_location_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            accuracy_m: default_location_accuracy_m(),
            hijri_offset: default_hijri_offset(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub heatmap: HeatmapConfig,
    #[serde(default)]
    pub qibla: QiblaConfig,
    #[serde(default)]
    pub location: LocationConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "barakah").context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("barakah.db"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    /// Write the current config out so the user has a file to edit.
    /// Called on first run; thereafter the file is the user's.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.scoring.jamaah_multiplier = 25;
        config.location.hijri_offset = -1;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.scoring.jamaah_multiplier, 25);
        assert_eq!(loaded.location.hijri_offset, -1);
        // untouched fields keep their defaults through the trip
        assert_eq!(loaded.scoring.base_on_time, 10);
        assert_eq!(loaded.streak.milestones, vec![7, 30, 100]);
    }

    #[test]
    fn partial_file_fills_missing_sections_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scoring]\nbase_on_time = 12\n").unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.scoring.base_on_time, 12);
        assert_eq!(loaded.scoring.jamaah_multiplier, 27);
        assert_eq!(loaded.heatmap.levels, vec![0, 1, 2, 3, 3, 4]);
    }
}
