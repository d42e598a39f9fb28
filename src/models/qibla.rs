use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub horizontal_accuracy_m: f64,
}

/// Raw magnetometer reading. The vertical (z) component is ignored by the
/// heading fusion but kept so samples can be passed through unmodified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MagnetometerSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyTier {
    High,
    Medium,
    Low,
}

impl AccuracyTier {
    pub fn display_name(&self) -> &'static str {
        match self {
            AccuracyTier::High => "high",
            AccuracyTier::Medium => "medium",
            AccuracyTier::Low => "low",
        }
    }
}

/// Direction snapshot toward the fixed target. Recomputed on every
/// location or heading update, never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QiblaData {
    /// Initial great-circle bearing, normalized to [0, 360).
    pub bearing_degrees: f64,
    /// Device heading, normalized to [0, 360).
    pub device_heading_degrees: f64,
    /// bearing - heading, deliberately un-normalized; consumers mapping to
    /// a rotation must handle negative and >360 values.
    pub offset_degrees: f64,
    pub distance_km: f64,
    pub accuracy_tier: AccuracyTier,
}
