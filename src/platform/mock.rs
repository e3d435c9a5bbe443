//! Scriptable location provider for testing and development

use crate::core::PermissionState;
use crate::platform::{
    now_ms, FixOptions, LocationProvider, PlatformError, PlatformResult, RawFix,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Mock location provider for testing and development
///
/// Fix responses are served from a FIFO queue. The user's answer to the
/// permission prompt is scripted with `set_prompt_response`.
pub struct MockLocationProvider {
    state: Mutex<MockState>,
}

struct MockState {
    permission: PermissionState,
    prompt_response: PermissionState,
    fail_query: bool,
    fail_prompt: bool,
    fail_settings: bool,
    responses: VecDeque<PlatformResult<RawFix>>,
    fix_delay: Option<Duration>,
    simulate_errors: bool,
    error_probability: f32,
    query_count: u32,
    prompt_count: u32,
    fix_request_count: u32,
    settings_open_count: u32,
    last_options: Option<FixOptions>,
}

impl MockLocationProvider {
    /// Provider with an undecided permission that the user will grant
    pub fn new() -> Self {
        Self::with_permission(PermissionState::undetermined(true))
    }

    /// Provider that already holds location permission
    pub fn granted() -> Self {
        Self::with_permission(PermissionState::granted())
    }

    pub fn with_permission(permission: PermissionState) -> Self {
        Self {
            state: Mutex::new(MockState {
                permission,
                prompt_response: PermissionState::granted(),
                fail_query: false,
                fail_prompt: false,
                fail_settings: false,
                responses: VecDeque::new(),
                fix_delay: None,
                simulate_errors: false,
                error_probability: 0.0,
                query_count: 0,
                prompt_count: 0,
                fix_request_count: 0,
                settings_open_count: 0,
                last_options: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// State the OS reports after the user answers the prompt
    pub fn set_prompt_response(&self, response: PermissionState) {
        self.state().prompt_response = response;
    }

    pub fn set_permission(&self, permission: PermissionState) {
        self.state().permission = permission;
    }

    /// Queue a raw fix, keeping its timestamp as given
    pub fn push_fix(&self, fix: RawFix) {
        self.state().responses.push_back(Ok(fix));
    }

    /// Queue a fix captured "now" with the given accuracy
    pub fn add_fix(&self, lat: f64, lon: f64, accuracy_m: Option<f64>) {
        let mut fix = RawFix::new(lat, lon).with_timestamp(now_ms());
        fix.accuracy_m = accuracy_m;
        self.push_fix(fix);
    }

    /// Queue a platform failure for the next fix request
    pub fn push_failure(&self, error: PlatformError) {
        self.state().responses.push_back(Err(error));
    }

    /// Delay every fix response, e.g. to exercise timeouts
    pub fn set_fix_delay(&self, delay: Option<Duration>) {
        self.state().fix_delay = delay;
    }

    pub fn fail_permission_query(&self, fail: bool) {
        self.state().fail_query = fail;
    }

    pub fn fail_permission_prompt(&self, fail: bool) {
        self.state().fail_prompt = fail;
    }

    pub fn fail_settings(&self, fail: bool) {
        self.state().fail_settings = fail;
    }

    /// Enable random fix failures with given probability (0.0 to 1.0)
    pub fn simulate_errors(&self, enable: bool, probability: f32) {
        let mut state = self.state();
        state.simulate_errors = enable;
        state.error_probability = probability.clamp(0.0, 1.0);
    }

    pub fn query_count(&self) -> u32 {
        self.state().query_count
    }

    pub fn prompt_count(&self) -> u32 {
        self.state().prompt_count
    }

    pub fn fix_request_count(&self) -> u32 {
        self.state().fix_request_count
    }

    pub fn settings_open_count(&self) -> u32 {
        self.state().settings_open_count
    }

    /// Options passed to the most recent fix request
    pub fn last_options(&self) -> Option<FixOptions> {
        self.state().last_options.clone()
    }

    pub fn queued_fix_count(&self) -> usize {
        self.state().responses.len()
    }

    fn should_simulate_error(state: &MockState) -> bool {
        if !state.simulate_errors {
            return false;
        }

        use rand::Rng;
        let mut rng = rand::thread_rng();
        rng.gen::<f32>() < state.error_probability
    }
}

impl Default for MockLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationProvider for MockLocationProvider {
    async fn query_permission(&self) -> PlatformResult<PermissionState> {
        let mut state = self.state();
        state.query_count += 1;

        if state.fail_query {
            return Err(PlatformError::Hardware {
                code: 3001,
                description: "Simulated permission query failure".to_string(),
            });
        }

        Ok(state.permission)
    }

    async fn prompt_permission(&self) -> PlatformResult<PermissionState> {
        let mut state = self.state();
        state.prompt_count += 1;

        if state.fail_prompt {
            return Err(PlatformError::Hardware {
                code: 3002,
                description: "Simulated permission prompt failure".to_string(),
            });
        }

        state.permission = state.prompt_response;
        Ok(state.permission)
    }

    async fn current_fix(&self, options: &FixOptions) -> PlatformResult<RawFix> {
        let (delay, response) = {
            let mut state = self.state();
            state.fix_request_count += 1;
            state.last_options = Some(options.clone());

            let response = if Self::should_simulate_error(&state) {
                Err(PlatformError::Timeout {
                    timeout_ms: options.timeout_ms,
                })
            } else {
                state.responses.pop_front().unwrap_or_else(|| {
                    Err(PlatformError::Unavailable {
                        details: "no fix queued".to_string(),
                    })
                })
            };
            (state.fix_delay, response)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        response
    }

    async fn open_location_settings(&self) -> PlatformResult<()> {
        let mut state = self.state();
        state.settings_open_count += 1;

        if state.fail_settings {
            return Err(PlatformError::Unsupported {
                operation: "open_location_settings".to_string(),
            });
        }

        Ok(())
    }
}
