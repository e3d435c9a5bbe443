//! Location acquisition service and guided tree capture
//!
//! The service never presents UI itself. A capture that misses the accuracy
//! gate comes back as `CaptureOutcome::NeedsDecision`; the caller asks the
//! user and feeds the answer to `resolve_capture`. `capture_with` runs the
//! same loop against a `CapturePrompt` and stops as soon as the hosting
//! context is cancelled.

use crate::acquisition::FixAcquirer;
use crate::api::types::{
    ApiResult, CaptureDecision, CaptureOutcome, LocationError, PendingCapture,
};
use crate::core::{GpsFix, PermissionState};
use crate::platform::LocationProvider;
use crate::utils::{ConfigError, LocatorConfig};
use crate::validation::{AccuracyBand, AccuracyPolicy};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// UI-side callback asked to accept or retry an imprecise fix
#[async_trait]
pub trait CapturePrompt: Send + Sync {
    async fn decide(&self, pending: &PendingCapture) -> CaptureDecision;
}

/// Entry point used by screens to geotag a tree
pub struct LocationAcquisitionService {
    provider: Arc<dyn LocationProvider>,
    acquirer: FixAcquirer,
    policy: AccuracyPolicy,
    config: LocatorConfig,
}

impl LocationAcquisitionService {
    /// Create a service with the default configuration
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        let config = LocatorConfig::default();
        Self {
            acquirer: FixAcquirer::new(provider.clone(), config.fix_options()),
            policy: config.accuracy_policy(),
            provider,
            config,
        }
    }

    pub fn with_config(
        provider: Arc<dyn LocationProvider>,
        config: LocatorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            acquirer: FixAcquirer::new(provider.clone(), config.fix_options()),
            policy: config.accuracy_policy(),
            provider,
            config,
        })
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    pub async fn check_permission(&self) -> PermissionState {
        self.acquirer.negotiator().check_permission().await
    }

    pub async fn request_permission(&self) -> bool {
        self.acquirer.negotiator().request_permission().await
    }

    pub async fn acquire_fix(&self) -> ApiResult<GpsFix> {
        self.acquirer.acquire_fix().await
    }

    /// Check against the configured default threshold
    pub fn is_accurate_enough(&self, accuracy_m: Option<f64>) -> bool {
        self.policy.is_accurate_enough(accuracy_m)
    }

    pub fn describe_accuracy(&self, accuracy_m: Option<f64>) -> AccuracyBand {
        AccuracyBand::from_accuracy(accuracy_m)
    }

    /// Acquire a fix for tagging a tree
    ///
    /// A fix outside the capture threshold is returned as `NeedsDecision`
    /// instead of being retried automatically.
    pub async fn capture_tree_location(&self) -> ApiResult<CaptureOutcome> {
        self.capture_attempt(1).await
    }

    /// Apply the user's answer to a pending capture
    pub async fn resolve_capture(
        &self,
        pending: PendingCapture,
        decision: CaptureDecision,
    ) -> ApiResult<CaptureOutcome> {
        match decision {
            CaptureDecision::Accept => {
                info!(
                    "user accepted {} fix after {} attempt(s)",
                    pending.band(),
                    pending.attempt()
                );
                Ok(CaptureOutcome::Accepted(pending.accept()))
            }
            CaptureDecision::Retry => {
                if !pending.can_retry() {
                    return Err(LocationError::RetryLimitReached {
                        attempts: pending.attempt(),
                    });
                }
                debug!("user requested capture retry");
                self.capture_attempt(pending.attempt() + 1).await
            }
        }
    }

    async fn capture_attempt(&self, attempt: u32) -> ApiResult<CaptureOutcome> {
        let fix = self.acquirer.acquire_fix().await?;

        if self.policy.passes_capture_gate(fix.accuracy_m()) {
            info!(
                "captured tree location ({}, {}) with {} accuracy",
                fix.lat(),
                fix.lon(),
                AccuracyBand::from_accuracy(fix.accuracy_m())
            );
            return Ok(CaptureOutcome::Accepted(fix));
        }

        info!(
            "capture attempt {} too imprecise ({} accuracy, threshold {} m), asking user",
            attempt,
            AccuracyBand::from_accuracy(fix.accuracy_m()),
            self.policy.capture_threshold_m
        );
        Ok(CaptureOutcome::NeedsDecision(PendingCapture::new(
            fix,
            attempt,
            self.config.max_capture_attempts,
        )))
    }

    /// Run guided capture to completion, asking `prompt` on every imprecise fix
    ///
    /// `cancel` flips to true (or its sender is dropped) when the hosting
    /// context goes away. Pending work is then discarded and `prompt` is not
    /// called again.
    pub async fn capture_with<P>(
        &self,
        prompt: &P,
        cancel: &mut watch::Receiver<bool>,
    ) -> ApiResult<GpsFix>
    where
        P: CapturePrompt + ?Sized,
    {
        let mut outcome = guarded(cancel, self.capture_tree_location()).await?;

        loop {
            let pending = match outcome {
                CaptureOutcome::Accepted(fix) => return Ok(fix),
                CaptureOutcome::NeedsDecision(pending) => pending,
            };

            let decision = guarded(cancel, async { Ok(prompt.decide(&pending).await) }).await?;
            outcome = guarded(cancel, self.resolve_capture(pending, decision)).await?;
        }
    }

    /// Best-effort deep link into the OS location settings
    pub async fn open_location_settings(&self) {
        if let Err(e) = self.provider.open_location_settings().await {
            warn!("could not open location settings: {}", e);
        }
    }
}

fn is_cancelled(cancel: &watch::Receiver<bool>) -> bool {
    *cancel.borrow() || cancel.has_changed().is_err()
}

async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            return;
        }
    }
}

/// Run `work` unless the context is cancelled first; a result that arrives
/// after cancellation is discarded
async fn guarded<T, F>(cancel: &mut watch::Receiver<bool>, work: F) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    if is_cancelled(cancel) {
        return Err(LocationError::Cancelled);
    }

    let result = tokio::select! {
        biased;
        _ = cancelled(cancel) => None,
        result = work => Some(result),
    };

    match result {
        Some(result) if !is_cancelled(cancel) => result,
        _ => {
            debug!("capture context cancelled, discarding result");
            Err(LocationError::Cancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::DenialReason;
    use crate::platform::{MockLocationProvider, RawFix};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Prompt answering from a script, optionally after a delay
    struct ScriptedPrompt {
        decisions: Mutex<VecDeque<CaptureDecision>>,
        delay: Option<Duration>,
        calls: AtomicU32,
    }

    impl ScriptedPrompt {
        fn new(decisions: &[CaptureDecision]) -> Self {
            Self {
                decisions: Mutex::new(decisions.iter().copied().collect()),
                delay: None,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CapturePrompt for ScriptedPrompt {
        async fn decide(&self, _pending: &PendingCapture) -> CaptureDecision {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.decisions
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(CaptureDecision::Accept)
        }
    }

    fn service(provider: &Arc<MockLocationProvider>) -> LocationAcquisitionService {
        LocationAcquisitionService::new(provider.clone())
    }

    #[tokio::test]
    async fn test_scenario_prompt_accepted() {
        let provider = Arc::new(MockLocationProvider::new());
        provider.push_fix(
            RawFix::new(39.309196, 26.685394)
                .with_accuracy(8.0)
                .with_timestamp(1_697_600_000_000),
        );

        let fix = service(&provider).acquire_fix().await.unwrap();
        assert_eq!(fix.lat(), 39.309196);
        assert_eq!(fix.lon(), 26.685394);
        assert_eq!(fix.accuracy_m(), Some(8.0));
        assert_eq!(provider.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_scenario_permanently_denied() {
        let provider = Arc::new(MockLocationProvider::with_permission(PermissionState::denied(false)));

        let result = service(&provider).acquire_fix().await;
        assert!(matches!(
            result,
            Err(LocationError::PermissionDenied {
                reason: DenialReason::PermanentlyRefused
            })
        ));
        assert_eq!(provider.prompt_count(), 0);
    }

    #[tokio::test]
    async fn test_request_permission_when_granted() {
        let provider = Arc::new(MockLocationProvider::granted());
        let service = service(&provider);

        assert!(service.check_permission().await.is_granted());
        assert!(service.request_permission().await);
        assert_eq!(provider.prompt_count(), 0);
    }

    #[tokio::test]
    async fn test_accurate_capture_is_final() {
        let provider = Arc::new(MockLocationProvider::granted());
        provider.add_fix(39.309196, 26.685394, Some(15.0));

        let outcome = service(&provider).capture_tree_location().await.unwrap();
        assert!(outcome.is_final());
    }

    #[tokio::test]
    async fn test_capture_without_accuracy_is_final() {
        let provider = Arc::new(MockLocationProvider::granted());
        provider.add_fix(39.309196, 26.685394, None);

        let outcome = service(&provider).capture_tree_location().await.unwrap();
        assert!(outcome.is_final());
    }

    #[tokio::test]
    async fn test_imprecise_capture_accept_keeps_fix() {
        let provider = Arc::new(MockLocationProvider::granted());
        provider.add_fix(39.309196, 26.685394, Some(25.0));
        let service = service(&provider);

        let pending = match service.capture_tree_location().await.unwrap() {
            CaptureOutcome::NeedsDecision(pending) => pending,
            other => panic!("expected a decision, got {:?}", other),
        };
        assert_eq!(pending.attempt(), 1);
        assert!(pending.can_retry());
        let offered = pending.fix().clone();

        let outcome = service
            .resolve_capture(pending, CaptureDecision::Accept)
            .await
            .unwrap();
        match outcome {
            CaptureOutcome::Accepted(fix) => {
                assert_eq!(fix.accuracy_m(), Some(25.0));
                assert_eq!(fix, offered);
            }
            other => panic!("expected accepted fix, got {:?}", other),
        }
        assert_eq!(provider.fix_request_count(), 1);
    }

    #[tokio::test]
    async fn test_retry_reacquires_and_regates() {
        let provider = Arc::new(MockLocationProvider::granted());
        provider.add_fix(1.0, 1.0, Some(40.0));
        provider.add_fix(1.0, 1.0, Some(30.0));
        provider.add_fix(1.000001, 1.0, Some(6.0));
        let service = service(&provider);

        let mut outcome = service.capture_tree_location().await.unwrap();
        let mut retries = 0;
        while let CaptureOutcome::NeedsDecision(pending) = outcome {
            retries += 1;
            outcome = service
                .resolve_capture(pending, CaptureDecision::Retry)
                .await
                .unwrap();
        }

        assert_eq!(retries, 2);
        assert_eq!(provider.fix_request_count(), 3);
        match outcome {
            CaptureOutcome::Accepted(fix) => assert_eq!(fix.accuracy_m(), Some(6.0)),
            other => panic!("expected accepted fix, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_retry_failure_propagates() {
        let provider = Arc::new(MockLocationProvider::granted());
        provider.add_fix(1.0, 1.0, Some(40.0));
        let service = service(&provider);

        let pending = match service.capture_tree_location().await.unwrap() {
            CaptureOutcome::NeedsDecision(pending) => pending,
            other => panic!("expected a decision, got {:?}", other),
        };

        // Queue is empty, so the retry cannot get a fix
        let result = service.resolve_capture(pending, CaptureDecision::Retry).await;
        assert!(matches!(result, Err(LocationError::LocationUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_attempt_cap() {
        let provider = Arc::new(MockLocationProvider::granted());
        provider.add_fix(1.0, 1.0, Some(40.0));
        provider.add_fix(1.0, 1.0, Some(35.0));
        let config = LocatorConfig {
            max_capture_attempts: Some(2),
            ..Default::default()
        };
        let service = LocationAcquisitionService::with_config(provider.clone(), config).unwrap();
        let prompt = ScriptedPrompt::new(&[CaptureDecision::Retry, CaptureDecision::Retry]);
        let (_tx, mut rx) = watch::channel(false);

        let result = service.capture_with(&prompt, &mut rx).await;
        assert_eq!(result, Err(LocationError::RetryLimitReached { attempts: 2 }));
        assert_eq!(prompt.calls(), 2);
        assert_eq!(provider.fix_request_count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let provider = Arc::new(MockLocationProvider::granted());
        let config = LocatorConfig {
            fix_timeout_ms: 0,
            ..Default::default()
        };
        assert!(LocationAcquisitionService::with_config(provider, config).is_err());
    }

    #[tokio::test]
    async fn test_capture_with_prompt() {
        let provider = Arc::new(MockLocationProvider::granted());
        provider.add_fix(39.309196, 26.685394, Some(25.0));
        provider.add_fix(39.309197, 26.685394, Some(12.0));
        let prompt = ScriptedPrompt::new(&[CaptureDecision::Retry]);
        let (_tx, mut rx) = watch::channel(false);

        let fix = service(&provider).capture_with(&prompt, &mut rx).await.unwrap();
        assert_eq!(fix.lat(), 39.309197);
        assert_eq!(fix.accuracy_m(), Some(12.0));
        assert_eq!(prompt.calls(), 1);
    }

    #[tokio::test]
    async fn test_capture_with_accept() {
        let provider = Arc::new(MockLocationProvider::granted());
        provider.add_fix(39.309196, 26.685394, Some(25.0));
        let prompt = ScriptedPrompt::new(&[CaptureDecision::Accept]);
        let (_tx, mut rx) = watch::channel(false);

        let fix = service(&provider).capture_with(&prompt, &mut rx).await.unwrap();
        assert_eq!(fix.accuracy_m(), Some(25.0));
        assert_eq!(provider.fix_request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_fix_pending() {
        let provider = Arc::new(MockLocationProvider::granted());
        provider.add_fix(39.309196, 26.685394, Some(25.0));
        provider.set_fix_delay(Some(Duration::from_secs(3)));
        let prompt = ScriptedPrompt::new(&[CaptureDecision::Retry]);
        let (tx, mut rx) = watch::channel(false);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let _ = tx.send(true);
        });

        let result = service(&provider).capture_with(&prompt, &mut rx).await;
        assert_eq!(result, Err(LocationError::Cancelled));
        assert_eq!(prompt.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_user_deciding() {
        let provider = Arc::new(MockLocationProvider::granted());
        provider.add_fix(39.309196, 26.685394, Some(25.0));
        provider.add_fix(39.309196, 26.685394, Some(3.0));
        let mut prompt = ScriptedPrompt::new(&[CaptureDecision::Retry]);
        prompt.delay = Some(Duration::from_secs(10));
        let (tx, mut rx) = watch::channel(false);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            let _ = tx.send(true);
        });

        let result = service(&provider).capture_with(&prompt, &mut rx).await;
        assert_eq!(result, Err(LocationError::Cancelled));
        assert_eq!(prompt.calls(), 1);
        // The retry decision was never applied
        assert_eq!(provider.fix_request_count(), 1);
    }

    #[tokio::test]
    async fn test_dropped_context_cancels() {
        let provider = Arc::new(MockLocationProvider::granted());
        provider.add_fix(39.309196, 26.685394, Some(3.0));
        let prompt = ScriptedPrompt::new(&[]);
        let (tx, mut rx) = watch::channel(false);
        drop(tx);

        let result = service(&provider).capture_with(&prompt, &mut rx).await;
        assert_eq!(result, Err(LocationError::Cancelled));
        assert_eq!(provider.fix_request_count(), 0);
    }

    #[tokio::test]
    async fn test_open_settings_failure_is_swallowed() {
        let provider = Arc::new(MockLocationProvider::with_permission(PermissionState::denied(false)));
        provider.fail_settings(true);

        service(&provider).open_location_settings().await;
        assert_eq!(provider.settings_open_count(), 1);
    }

    #[test]
    fn test_accuracy_helpers() {
        let provider = Arc::new(MockLocationProvider::granted());
        let service = service(&provider);

        assert!(service.is_accurate_enough(None));
        assert!(service.is_accurate_enough(Some(10.0)));
        assert!(!service.is_accurate_enough(Some(12.0)));
        assert_eq!(service.describe_accuracy(Some(12.0)), AccuracyBand::Fair);
    }
}
