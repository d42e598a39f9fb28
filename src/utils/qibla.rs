use crate::config::QiblaConfig;
use crate::models::{AccuracyTier, MagnetometerSample, Position, QiblaData};

const EARTH_RADIUS_KM: f64 = 6371.0;

fn normalize_degrees(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Initial great-circle bearing from (lat1, lon1) toward (lat2, lon2),
/// normalized to [0, 360).
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();
    normalize_degrees(y.atan2(x).to_degrees())
}

/// Haversine great-circle distance in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Device heading from a raw magnetic-field sample: atan2 over the
/// horizontal plane, vertical component ignored, normalized to [0, 360).
pub fn heading_from_sample(sample: MagnetometerSample) -> f64 {
    normalize_degrees(sample.y.atan2(sample.x).to_degrees())
}

/// Accuracy tier from the reported horizontal positioning error. Heading
/// stability plays no part in the tier.
pub fn accuracy_tier(horizontal_accuracy_m: f64, config: &QiblaConfig) -> AccuracyTier {
    if horizontal_accuracy_m < config.accuracy_high_m {
        AccuracyTier::High
    } else if horizontal_accuracy_m < config.accuracy_medium_m {
        AccuracyTier::Medium
    } else {
        AccuracyTier::Low
    }
}

/// Full direction snapshot for a position and heading sample. The offset
/// is bearing minus heading, left un-normalized on purpose: consumers
/// mapping it to a rotation must cope with negative and >360 values.
pub fn compute(position: Position, sample: MagnetometerSample, config: &QiblaConfig) -> QiblaData {
    let bearing = initial_bearing(
        position.latitude,
        position.longitude,
        config.kaaba_latitude,
        config.kaaba_longitude,
    );
    let heading = heading_from_sample(sample);
    QiblaData {
        bearing_degrees: bearing,
        device_heading_degrees: heading,
        offset_degrees: bearing - heading,
        distance_km: haversine_km(
            position.latitude,
            position.longitude,
            config.kaaba_latitude,
            config.kaaba_longitude,
        ),
        accuracy_tier: accuracy_tier(position.horizontal_accuracy_m, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KAABA_LAT: f64 = 21.4225;
    const KAABA_LON: f64 = 39.8262;

    #[test]
    fn distance_fifty_km_north_of_target() {
        // 50 km due north along a meridian: 50 / 6371 radians of latitude
        let dlat = (50.0 / EARTH_RADIUS_KM).to_degrees();
        let d = haversine_km(KAABA_LAT + dlat, KAABA_LON, KAABA_LAT, KAABA_LON);
        assert!((d - 50.0).abs() < 0.5, "got {}", d);
    }

    #[test]
    fn bearing_is_reproducible_and_normalized() {
        let b1 = initial_bearing(33.6938, 73.0651, KAABA_LAT, KAABA_LON);
        let b2 = initial_bearing(33.6938, 73.0651, KAABA_LAT, KAABA_LON);
        assert_eq!(b1, b2);
        assert!((0.0..360.0).contains(&b1));
        // Islamabad faces roughly west-southwest toward Makkah
        assert!((240.0..280.0).contains(&b1), "got {}", b1);
    }

    #[test]
    fn due_south_point_bears_north() {
        let b = initial_bearing(KAABA_LAT - 1.0, KAABA_LON, KAABA_LAT, KAABA_LON);
        assert!(b.abs() < 1e-6 || (360.0 - b) < 1e-6);
    }

    #[test]
    fn heading_fusion_ignores_vertical_axis() {
        let east = MagnetometerSample { x: 0.0, y: 1.0, z: 5.0 };
        assert!((heading_from_sample(east) - 90.0).abs() < 1e-9);
        let west = MagnetometerSample { x: 0.0, y: -1.0, z: -3.0 };
        assert!((heading_from_sample(west) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn offset_left_unnormalized() {
        let config = QiblaConfig::default();
        let position = Position {
            latitude: KAABA_LAT - 1.0,
            longitude: KAABA_LON,
            horizontal_accuracy_m: 5.0,
        };
        // heading ~270 with bearing ~0 drives the offset negative
        let sample = MagnetometerSample { x: 0.0, y: -1.0, z: 0.0 };
        let data = compute(position, sample, &config);
        assert!(data.offset_degrees < 0.0);
    }

    #[test]
    fn accuracy_tiers_follow_thresholds() {
        let config = QiblaConfig::default();
        assert_eq!(accuracy_tier(5.0, &config), AccuracyTier::High);
        assert_eq!(accuracy_tier(10.0, &config), AccuracyTier::Medium);
        assert_eq!(accuracy_tier(49.9, &config), AccuracyTier::Medium);
        assert_eq!(accuracy_tier(120.0, &config), AccuracyTier::Low);
    }
}
