//! OS permission negotiation
//!
//! Both operations are infallible from the caller's point of view. A failed
//! query degrades to "undetermined, cannot ask" and a failed prompt counts
//! as a denial.

use crate::core::{PermissionState, PermissionStatus};
use crate::platform::LocationProvider;
use log::{debug, warn};
use std::sync::Arc;

/// Checks and requests location authorization through a provider
#[derive(Clone)]
pub struct PermissionNegotiator {
    provider: Arc<dyn LocationProvider>,
}

impl PermissionNegotiator {
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        Self { provider }
    }

    /// Query the current authorization without prompting
    pub async fn check_permission(&self) -> PermissionState {
        match self.provider.query_permission().await {
            Ok(state) => {
                debug!(
                    "location permission: {:?} (can ask again: {})",
                    state.status, state.can_ask_again
                );
                state
            }
            Err(e) => {
                warn!("permission query failed, treating as undetermined: {}", e);
                PermissionState::undetermined(false)
            }
        }
    }

    /// Prompt for authorization unless it is already decided
    ///
    /// Returns true iff the resulting status is granted.
    pub async fn request_permission(&self) -> bool {
        let current = self.check_permission().await;
        if current.is_granted() {
            return true;
        }

        if !current.can_ask_again {
            debug!("permission prompt skipped: the OS will not show it again");
            return false;
        }

        debug!("prompting for location permission");
        match self.provider.prompt_permission().await {
            Ok(state) => {
                debug!("permission prompt answered: {:?}", state.status);
                state.status == PermissionStatus::Granted
            }
            Err(e) => {
                warn!("permission prompt failed, treating as denied: {}", e);
                false
            }
        }
    }
}
