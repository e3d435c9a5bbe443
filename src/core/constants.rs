//! Acquisition parameters and coordinate limits

/// Upper bound on a single platform fix request (milliseconds)
pub const FIX_TIMEOUT_MS: u32 = 5000;

/// Default accuracy threshold for a fix to be considered usable (meters)
pub const DEFAULT_ACCURACY_THRESHOLD_M: f64 = 10.0;

/// Looser threshold applied during guided tree capture (meters)
pub const CAPTURE_ACCURACY_THRESHOLD_M: f64 = 20.0;

/// Fractional digits kept on latitude/longitude (~0.11 m)
pub const COORDINATE_DECIMALS: i32 = 6;

pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;
