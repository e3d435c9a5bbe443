//! Core data types for location acquisition

use serde::{Deserialize, Serialize};

/// OS authorization decision for location access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// Current OS authorization together with whether a prompt can still be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionState {
    pub status: PermissionStatus,
    /// Only meaningful when `status` is not `Granted`
    pub can_ask_again: bool,
}

impl PermissionState {
    pub fn granted() -> Self {
        Self {
            status: PermissionStatus::Granted,
            can_ask_again: false,
        }
    }

    pub fn denied(can_ask_again: bool) -> Self {
        Self {
            status: PermissionStatus::Denied,
            can_ask_again,
        }
    }

    pub fn undetermined(can_ask_again: bool) -> Self {
        Self {
            status: PermissionStatus::Undetermined,
            can_ask_again,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.status == PermissionStatus::Granted
    }

    /// Whether prompting the user could still change the outcome
    pub fn should_prompt(&self) -> bool {
        !self.is_granted() && self.can_ask_again
    }
}

/// A single validated device position
///
/// Instances only come out of a successful acquisition, so the coordinates
/// are always rounded and inside the WGS84 range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpsFix {
    lat: f64,
    lon: f64,
    alt: Option<f64>,
    accuracy_m: Option<f64>,
    timestamp_ms: u64,
}

impl GpsFix {
    pub(crate) fn new(
        lat: f64,
        lon: f64,
        alt: Option<f64>,
        accuracy_m: Option<f64>,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            lat,
            lon,
            alt,
            accuracy_m,
            timestamp_ms,
        }
    }

    /// Latitude in decimal degrees
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Altitude in meters, if the platform supplied one
    pub fn alt(&self) -> Option<f64> {
        self.alt
    }

    /// Horizontal uncertainty radius in meters, if reported
    pub fn accuracy_m(&self) -> Option<f64> {
        self.accuracy_m
    }

    /// Platform capture time (milliseconds since the Unix epoch, UTC)
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }
}
