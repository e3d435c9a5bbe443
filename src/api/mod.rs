//! Caller-facing API
//!
//! This module provides the acquisition service consumed by UI screens,
//! its error and outcome types, and fix formatting.

pub mod capture;
pub mod types;
pub mod formatting;

// Re-export commonly used API types
pub use types::{
    ApiResult, LocationError, DenialReason, RecoveryAction,
    CaptureDecision, CaptureOutcome, PendingCapture
};
pub use capture::{LocationAcquisitionService, CapturePrompt};
pub use formatting::{FixFormatter, FormattedFix, TextFormatter, JsonFormatter};
