//! Tree Locator
//!
//! Device geolocation acquisition for geotagging trees: permission
//! negotiation, single-shot fix acquisition with validation, and a guided
//! capture flow that lets the user accept or retry an imprecise fix.

pub mod core;
pub mod platform;
pub mod validation;
pub mod acquisition;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use crate::core::{GpsFix, PermissionState, PermissionStatus};
pub use platform::{LocationProvider, MockLocationProvider, FixOptions, AccuracyLevel, RawFix, PlatformError};
pub use validation::{AccuracyBand, AccuracyPolicy, is_accurate_enough, describe_accuracy};
pub use acquisition::{PermissionNegotiator, FixAcquirer};
pub use utils::{LocatorConfig, ConfigError};
pub use api::{
    LocationAcquisitionService, CapturePrompt, ApiResult, LocationError, DenialReason,
    RecoveryAction, CaptureDecision, CaptureOutcome, PendingCapture,
    FixFormatter, FormattedFix, TextFormatter, JsonFormatter
};
