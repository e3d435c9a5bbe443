//! Platform location subsystem error types

use thiserror::Error;

/// Errors raised by a `LocationProvider` implementation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlatformError {
    /// The platform did not produce a fix in time
    #[error("location request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u32 },
    /// Location services are switched off at the OS level
    #[error("location services are disabled")]
    ServiceDisabled,
    /// No fix could be produced (no signal, radio off, etc.)
    #[error("position unavailable: {details}")]
    Unavailable { details: String },
    /// Vendor-specific failure
    #[error("platform error {code}: {description}")]
    Hardware { code: u32, description: String },
    /// The operation does not exist on this platform
    #[error("{operation} is not supported on this platform")]
    Unsupported { operation: String },
}

/// Result type for provider operations
pub type PlatformResult<T> = Result<T, PlatformError>;

impl PlatformError {
    /// Whether asking again later might succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlatformError::Timeout { .. } | PlatformError::Unavailable { .. }
        )
    }
}
