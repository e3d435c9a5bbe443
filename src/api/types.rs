//! Common API types and data structures

use crate::core::GpsFix;
use crate::platform::PlatformError;
use crate::validation::AccuracyBand;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for API operations
pub type ApiResult<T> = Result<T, LocationError>;

/// Why location access was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenialReason {
    /// The user answered "don't allow" to the prompt
    Declined,
    /// The OS will not show the prompt again
    PermanentlyRefused,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::Declined => write!(f, "user declined the prompt"),
            DenialReason::PermanentlyRefused => {
                write!(f, "permission permanently refused; change it in the OS settings")
            }
        }
    }
}

/// Failures surfaced to callers of the acquisition service
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    /// User or OS refused location access
    #[error("location permission denied: {reason}")]
    PermissionDenied { reason: DenialReason },
    /// The platform could not produce a usable fix
    #[error("location unavailable: {message}")]
    LocationUnavailable { message: String },
    /// The requesting context went away while a capture was in flight
    #[error("location capture cancelled")]
    Cancelled,
    /// A configured attempt cap was exhausted
    #[error("gave up after {attempts} capture attempts")]
    RetryLimitReached { attempts: u32 },
}

impl From<PlatformError> for LocationError {
    fn from(error: PlatformError) -> Self {
        LocationError::LocationUnavailable {
            message: error.to_string(),
        }
    }
}

/// What the UI should offer after a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Deep link the user into the OS location settings
    OpenSettings,
    /// Offer to try again
    Retry,
    /// Nothing to offer
    None,
}

impl LocationError {
    /// Get the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            LocationError::PermissionDenied { .. } => RecoveryAction::OpenSettings,
            LocationError::LocationUnavailable { .. } => RecoveryAction::Retry,
            LocationError::Cancelled => RecoveryAction::None,
            LocationError::RetryLimitReached { .. } => RecoveryAction::None,
        }
    }

    pub fn is_permission_error(&self) -> bool {
        matches!(self, LocationError::PermissionDenied { .. })
    }
}

/// The user's answer when a captured fix is not accurate enough
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureDecision {
    /// Keep the imprecise fix
    Accept,
    /// Acquire a new fix
    Retry,
}

/// A fix that failed the capture accuracy gate and awaits a user decision
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCapture {
    fix: GpsFix,
    attempt: u32,
    max_attempts: Option<u32>,
}

impl PendingCapture {
    pub(crate) fn new(fix: GpsFix, attempt: u32, max_attempts: Option<u32>) -> Self {
        Self {
            fix,
            attempt,
            max_attempts,
        }
    }

    /// The imprecise fix offered to the user
    pub fn fix(&self) -> &GpsFix {
        &self.fix
    }

    pub fn band(&self) -> AccuracyBand {
        AccuracyBand::from_accuracy(self.fix.accuracy_m())
    }

    /// 1-based attempt number that produced this fix
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Whether a retry is still permitted
    pub fn can_retry(&self) -> bool {
        self.max_attempts.map_or(true, |max| self.attempt < max)
    }

    /// Take the fix as-is
    pub fn accept(self) -> GpsFix {
        self.fix
    }
}

/// Result of one guided capture step
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// Fix is final
    Accepted(GpsFix),
    /// Fix is too imprecise; the user has to accept or retry
    NeedsDecision(PendingCapture),
}

impl CaptureOutcome {
    pub fn is_final(&self) -> bool {
        matches!(self, CaptureOutcome::Accepted(_))
    }
}
