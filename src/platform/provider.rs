//! Location provider trait and request options

use crate::core::{PermissionState, FIX_TIMEOUT_MS};
use crate::platform::{PlatformError, PlatformResult, RawFix};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Abstraction over the device location subsystem
///
/// Implementations wrap the OS SDK (or a scripted mock). They are used by a
/// single logical flow at a time.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Read the current authorization without prompting the user
    async fn query_permission(&self) -> PlatformResult<PermissionState>;

    /// Show the OS permission prompt and report the resulting state
    async fn prompt_permission(&self) -> PlatformResult<PermissionState>;

    /// Request a single position sample
    async fn current_fix(&self, options: &FixOptions) -> PlatformResult<RawFix>;

    /// Deep link into the OS location settings
    async fn open_location_settings(&self) -> PlatformResult<()> {
        Err(PlatformError::Unsupported {
            operation: "open_location_settings".to_string(),
        })
    }
}

/// Requested fix quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyLevel {
    /// Network/cell based, roughly 100 m
    Balanced,
    /// Roughly 10 m
    High,
    /// Best the device can do (GNSS)
    Highest,
}

/// Parameters passed to `LocationProvider::current_fix`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixOptions {
    pub accuracy: AccuracyLevel,
    /// Platform-side timeout (milliseconds)
    pub timeout_ms: u32,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            accuracy: AccuracyLevel::Highest,
            timeout_ms: FIX_TIMEOUT_MS,
        }
    }
}

impl FixOptions {
    pub fn new(accuracy: AccuracyLevel, timeout_ms: u32) -> Self {
        Self {
            accuracy,
            timeout_ms,
        }
    }
}
