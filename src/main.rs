//! Interactive tree geotagging demo
//!
//! Runs the guided capture flow against a scripted location provider and
//! asks on stdin whether to keep imprecise fixes.
//!
//! Usage: tree-locator [config.json] [--deny]

use async_trait::async_trait;
use log::info;
use std::env;
use std::error::Error;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::{watch, Mutex};
use tree_locator::{
    CaptureDecision, CapturePrompt, FixFormatter, JsonFormatter, LocationAcquisitionService,
    LocatorConfig, MockLocationProvider, PendingCapture, PermissionState, RawFix,
    RecoveryAction, TextFormatter,
};

/// Reads accept/retry answers from standard input
struct StdinPrompt {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl StdinPrompt {
    fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

#[async_trait]
impl CapturePrompt for StdinPrompt {
    async fn decide(&self, pending: &PendingCapture) -> CaptureDecision {
        let text = TextFormatter::default();
        println!("Attempt {}: {}", pending.attempt(), text.format(pending.fix()));

        if !pending.can_retry() {
            println!("No retries left, keeping this fix.");
            return CaptureDecision::Accept;
        }

        println!("Accuracy is {}. [a]ccept or [r]etry?", pending.band());
        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().eq_ignore_ascii_case("r") => CaptureDecision::Retry,
            _ => CaptureDecision::Accept,
        }
    }
}

/// Provider scripted to improve its fix on every attempt
fn scripted_provider(deny: bool) -> MockLocationProvider {
    let provider = MockLocationProvider::new();
    if deny {
        provider.set_prompt_response(PermissionState::denied(false));
    }

    let captured_at = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    provider.push_fix(
        RawFix::new(39.30922871, 26.68551204)
            .with_altitude(112.4)
            .with_accuracy(35.0)
            .with_timestamp(captured_at),
    );
    provider.push_fix(
        RawFix::new(39.30919582, 26.68539377)
            .with_altitude(110.9)
            .with_accuracy(24.0)
            .with_timestamp(captured_at + 4_000),
    );
    provider.push_fix(
        RawFix::new(39.3091960, 26.6853940)
            .with_altitude(111.2)
            .with_accuracy(7.5)
            .with_timestamp(captured_at + 9_000),
    );
    provider
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut config_path = None;
    let mut deny = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--deny" => deny = true,
            path => config_path = Some(path.to_string()),
        }
    }

    let config = match config_path {
        Some(path) => {
            info!("loading configuration from {}", path);
            LocatorConfig::from_file(path)?
        }
        None => LocatorConfig::default(),
    };

    let provider = Arc::new(scripted_provider(deny));
    let service = LocationAcquisitionService::with_config(provider, config)?;

    // Ctrl-C tears down the capture context
    let (cancel_tx, mut cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    println!("=== Tree Locator - Guided Capture Demo ===\n");

    let prompt = StdinPrompt::new();
    match service.capture_with(&prompt, &mut cancel_rx).await {
        Ok(fix) => {
            println!("\nTree location: {}", TextFormatter::default().format(&fix));
            println!("{}", JsonFormatter { pretty: true }.format(&fix));
        }
        Err(e) => {
            println!("\nCapture failed: {}", e);
            match e.recovery_action() {
                RecoveryAction::OpenSettings => {
                    println!("Enable location access for this app in the system settings.");
                    service.open_location_settings().await;
                }
                RecoveryAction::Retry => println!("Move to open sky and try again."),
                RecoveryAction::None => {}
            }
        }
    }

    Ok(())
}
