//! Coordinate normalization and range checks

use crate::core::{COORDINATE_DECIMALS, MAX_LATITUDE, MAX_LONGITUDE};

/// Round a coordinate to `COORDINATE_DECIMALS` fractional digits
pub fn round_coordinate(value: f64) -> f64 {
    let scale = 10f64.powi(COORDINATE_DECIMALS);
    (value * scale).round() / scale
}

/// WGS84 range validation
pub struct CoordinateValidator;

impl CoordinateValidator {
    /// Validate a latitude/longitude pair. NaN and infinities are rejected.
    pub fn validate_wgs84(lat: f64, lon: f64) -> Result<(), &'static str> {
        if !(-MAX_LATITUDE..=MAX_LATITUDE).contains(&lat) {
            return Err("latitude out of range: must be between -90 and 90 degrees");
        }

        if !(-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&lon) {
            return Err("longitude out of range: must be between -180 and 180 degrees");
        }

        Ok(())
    }

    /// Keep an optional measurement only when it is a finite number
    pub fn finite(value: Option<f64>) -> Option<f64> {
        value.filter(|v| v.is_finite())
    }

    /// Keep an accuracy radius only when it is finite and non-negative
    pub fn accuracy_radius(value: Option<f64>) -> Option<f64> {
        value.filter(|v| v.is_finite() && *v >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_to_six_decimals() {
        assert_eq!(round_coordinate(39.3091964), 39.309196);
        assert_eq!(round_coordinate(26.6853946), 26.685395);
        assert_eq!(round_coordinate(-122.33210049), -122.3321);
        assert_eq!(round_coordinate(39.309196), 39.309196);
    }

    #[test]
    fn test_wgs84_validation() {
        assert!(CoordinateValidator::validate_wgs84(39.309196, 26.685394).is_ok());
        assert!(CoordinateValidator::validate_wgs84(90.0, 180.0).is_ok());
        assert!(CoordinateValidator::validate_wgs84(-90.0, -180.0).is_ok());

        assert!(CoordinateValidator::validate_wgs84(100.0, 0.0).is_err());
        assert!(CoordinateValidator::validate_wgs84(0.0, -180.5).is_err());
        assert!(CoordinateValidator::validate_wgs84(f64::NAN, 0.0).is_err());
        assert!(CoordinateValidator::validate_wgs84(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_optional_measurements() {
        assert_eq!(CoordinateValidator::finite(Some(12.5)), Some(12.5));
        assert_eq!(CoordinateValidator::finite(Some(f64::NAN)), None);
        assert_eq!(CoordinateValidator::accuracy_radius(Some(-1.0)), None);
        assert_eq!(CoordinateValidator::accuracy_radius(Some(0.0)), Some(0.0));
        assert_eq!(CoordinateValidator::accuracy_radius(None), None);
    }
}
