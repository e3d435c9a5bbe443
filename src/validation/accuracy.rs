//! Accuracy policy for position fixes
//!
//! A fix without an accuracy claim is never rejected: the platform made no
//! statement, so there is nothing to hold against it.

use crate::core::{CAPTURE_ACCURACY_THRESHOLD_M, DEFAULT_ACCURACY_THRESHOLD_M};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-facing accuracy category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyBand {
    /// Accuracy <= 5 m
    Excellent,
    /// 5 m < accuracy <= 10 m
    Good,
    /// 10 m < accuracy <= 20 m
    Fair,
    /// Accuracy > 20 m
    Poor,
    /// No accuracy reported
    Unknown,
}

impl AccuracyBand {
    pub fn from_accuracy(accuracy_m: Option<f64>) -> Self {
        match accuracy_m {
            None => AccuracyBand::Unknown,
            Some(a) if a <= 5.0 => AccuracyBand::Excellent,
            Some(a) if a <= 10.0 => AccuracyBand::Good,
            Some(a) if a <= 20.0 => AccuracyBand::Fair,
            Some(_) => AccuracyBand::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccuracyBand::Excellent => "excellent",
            AccuracyBand::Good => "good",
            AccuracyBand::Fair => "fair",
            AccuracyBand::Poor => "poor",
            AccuracyBand::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AccuracyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// True when no accuracy is claimed or the claim is within `threshold_m`
pub fn is_accurate_enough(accuracy_m: Option<f64>, threshold_m: f64) -> bool {
    match accuracy_m {
        None => true,
        Some(a) => a <= threshold_m,
    }
}

/// Map an accuracy radius onto its display band
pub fn describe_accuracy(accuracy_m: Option<f64>) -> AccuracyBand {
    AccuracyBand::from_accuracy(accuracy_m)
}

/// Accuracy thresholds used by acquisition and guided capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyPolicy {
    /// Threshold for `is_accurate_enough` (meters)
    pub default_threshold_m: f64,
    /// Looser threshold gating the accept/retry choice (meters)
    pub capture_threshold_m: f64,
}

impl Default for AccuracyPolicy {
    fn default() -> Self {
        Self {
            default_threshold_m: DEFAULT_ACCURACY_THRESHOLD_M,
            capture_threshold_m: CAPTURE_ACCURACY_THRESHOLD_M,
        }
    }
}

impl AccuracyPolicy {
    pub fn new(default_threshold_m: f64, capture_threshold_m: f64) -> Self {
        Self {
            default_threshold_m,
            capture_threshold_m,
        }
    }

    pub fn is_accurate_enough(&self, accuracy_m: Option<f64>) -> bool {
        is_accurate_enough(accuracy_m, self.default_threshold_m)
    }

    /// Whether a captured fix can be accepted without asking the user
    pub fn passes_capture_gate(&self, accuracy_m: Option<f64>) -> bool {
        is_accurate_enough(accuracy_m, self.capture_threshold_m)
    }
}
