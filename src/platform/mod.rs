//! Platform abstraction for the device location subsystem
//!
//! The OS location SDK is reached only through the `LocationProvider` trait,
//! so acquisition logic can run against a scripted mock.

pub mod provider;
pub mod mock;
pub mod error;

pub use provider::{LocationProvider, FixOptions, AccuracyLevel};
pub use mock::MockLocationProvider;
pub use error::{PlatformError, PlatformResult};

use std::time::{SystemTime, UNIX_EPOCH};

/// Unvalidated position sample as reported by the platform
#[derive(Debug, Clone, PartialEq)]
pub struct RawFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub accuracy_m: Option<f64>,
    /// Capture time reported by the platform (milliseconds since epoch)
    pub captured_at_ms: u64,
}

impl RawFix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            accuracy_m: None,
            captured_at_ms: 0, // Set by the provider implementation
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }

    pub fn with_timestamp(mut self, captured_at_ms: u64) -> Self {
        self.captured_at_ms = captured_at_ms;
        self
    }
}

/// Wall-clock time in milliseconds since the Unix epoch
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
