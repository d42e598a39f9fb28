use thiserror::Error;

use crate::config::LocationConfig;
use crate::models::{MagnetometerSample, Position};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SensorError {
    #[error("permission to read the sensor was denied")]
    PermissionDenied,
    #[error("sensor unavailable: {0}")]
    Unavailable(String),
}

/// Source of a position fix. Errors degrade the qibla output to an
/// explicit unavailable state; they never fail the tracker.
pub trait LocationProvider {
    fn current_position(&self) -> Result<Position, SensorError>;
}

/// Source of magnetic-field samples. A real device would push these on a
/// sub-second timer; here a pull suffices and the drop of the source is
/// the unsubscribe.
pub trait HeadingSource {
    fn sample(&mut self) -> Result<MagnetometerSample, SensorError>;
}

/// Position fix backed by the configured coordinate, with its configured
/// assumed accuracy.
pub struct ConfigLocation<'a> {
    config: &'a LocationConfig,
}

impl<'a> ConfigLocation<'a> {
    pub fn new(config: &'a LocationConfig) -> Self {
        Self { config }
    }
}

impl LocationProvider for ConfigLocation<'_> {
    fn current_position(&self) -> Result<Position, SensorError> {
        if !(-90.0..=90.0).contains(&self.config.latitude)
            || !(-180.0..=180.0).contains(&self.config.longitude)
        {
            return Err(SensorError::Unavailable(
                "configured coordinate out of range".to_string(),
            ));
        }
        Ok(Position {
            latitude: self.config.latitude,
            longitude: self.config.longitude,
            horizontal_accuracy_m: self.config.accuracy_m,
        })
    }
}

/// Heading source fed from a one-shot sample, e.g. parsed off the
/// command line.
pub struct FixedHeading(pub MagnetometerSample);

impl HeadingSource for FixedHeading {
    fn sample(&mut self) -> Result<MagnetometerSample, SensorError> {
        Ok(self.0)
    }
}
