//! Single-shot fix acquisition

use crate::acquisition::PermissionNegotiator;
use crate::api::types::{ApiResult, DenialReason, LocationError};
use crate::core::GpsFix;
use crate::platform::{FixOptions, LocationProvider, PlatformError, RawFix};
use crate::validation::{round_coordinate, CoordinateValidator};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Negotiates permission and turns one platform sample into a `GpsFix`
///
/// Every failure is terminal for the call; retries belong to guided capture.
#[derive(Clone)]
pub struct FixAcquirer {
    provider: Arc<dyn LocationProvider>,
    negotiator: PermissionNegotiator,
    options: FixOptions,
}

impl FixAcquirer {
    pub fn new(provider: Arc<dyn LocationProvider>, options: FixOptions) -> Self {
        Self {
            negotiator: PermissionNegotiator::new(provider.clone()),
            provider,
            options,
        }
    }

    pub fn negotiator(&self) -> &PermissionNegotiator {
        &self.negotiator
    }

    pub fn options(&self) -> &FixOptions {
        &self.options
    }

    /// Acquire one validated fix
    pub async fn acquire_fix(&self) -> ApiResult<GpsFix> {
        self.ensure_permission().await?;
        let raw = self.request_sample().await?;
        Self::normalize(raw)
    }

    async fn ensure_permission(&self) -> ApiResult<()> {
        let state = self.negotiator.check_permission().await;
        if state.is_granted() {
            return Ok(());
        }

        if !state.should_prompt() {
            return Err(LocationError::PermissionDenied {
                reason: DenialReason::PermanentlyRefused,
            });
        }

        if self.negotiator.request_permission().await {
            Ok(())
        } else {
            Err(LocationError::PermissionDenied {
                reason: DenialReason::Declined,
            })
        }
    }

    async fn request_sample(&self) -> ApiResult<RawFix> {
        let limit = Duration::from_millis(u64::from(self.options.timeout_ms));
        debug!(
            "requesting {:?} fix (timeout {}ms)",
            self.options.accuracy, self.options.timeout_ms
        );

        match timeout(limit, self.provider.current_fix(&self.options)).await {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(e)) => {
                if e.is_transient() {
                    debug!("fix request failed: {}", e);
                } else {
                    warn!("fix request failed: {}", e);
                }
                Err(e.into())
            }
            Err(_) => {
                debug!("fix request exceeded {}ms", self.options.timeout_ms);
                Err(PlatformError::Timeout {
                    timeout_ms: self.options.timeout_ms,
                }
                .into())
            }
        }
    }

    /// Round, range-check and package a platform sample
    pub(crate) fn normalize(raw: RawFix) -> ApiResult<GpsFix> {
        let lat = round_coordinate(raw.latitude);
        let lon = round_coordinate(raw.longitude);

        if let Err(reason) = CoordinateValidator::validate_wgs84(lat, lon) {
            warn!(
                "platform returned out-of-range coordinate ({}, {})",
                raw.latitude, raw.longitude
            );
            return Err(LocationError::LocationUnavailable {
                message: format!("coordinate out of range: {}", reason),
            });
        }

        Ok(GpsFix::new(
            lat,
            lon,
            CoordinateValidator::finite(raw.altitude),
            CoordinateValidator::accuracy_radius(raw.accuracy_m),
            raw.captured_at_ms,
        ))
    }
}
