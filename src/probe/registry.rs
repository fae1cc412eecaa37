//! Registry probe
//!
//! Drives the trademark search form once per call:
//! - launch a session, open the form (bounded by the page-load timeout)
//! - wait for the brand input, enter the brand, trigger the search
//! - wait the settle interval, classify the resulting page
//! - close the session on every exit path
//!
//! Failures never escape `check_availability`; they become
//! `AvailabilitySignal::ConnectionError`.

use crate::cli::config::{ProbeConfig, TypingConfig, TypingMode};
use crate::errors::ProbeFailure;
use crate::probe::classify::PageClassifier;
use crate::probe::session::{SearchSession, SessionLauncher};
use crate::types::AvailabilitySignal;
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

/// Interval between checks for the brand input
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Anything that can answer whether a brand is taken
#[async_trait]
pub trait AvailabilityProbe: Send + Sync {
    /// Never fails; problems are reported as `ConnectionError`
    async fn check_availability(&self, brand: &str) -> AvailabilitySignal;
}

/// Where the search form lives and how to drive it
#[derive(Debug, Clone)]
pub struct SearchTarget {
    pub url: String,
    pub input_name: String,
    pub button_id: String,
}

impl SearchTarget {
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self {
            url: config.search_url.clone(),
            input_name: config.input_name.clone(),
            button_id: config.button_id.clone(),
        }
    }
}

/// Waits and delays applied while driving the form
#[derive(Debug, Clone)]
pub struct ProbeTiming {
    pub page_load_timeout: Duration,
    pub input_wait: Duration,
    pub input_poll: Duration,
    pub settle: Duration,
    pub settle_jitter: Duration,
    pub typing: TypingConfig,
}

impl ProbeTiming {
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self {
            page_load_timeout: config.page_load_timeout(),
            input_wait: config.input_wait(),
            input_poll: INPUT_POLL_INTERVAL,
            settle: Duration::from_millis(config.settle_ms),
            settle_jitter: Duration::from_millis(config.settle_jitter_ms),
            typing: config.typing.clone(),
        }
    }

    /// Settle interval plus uniform jitter
    pub fn settle_delay(&self) -> Duration {
        let jitter_ms = self.settle_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.settle;
        }
        self.settle + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }

    /// Pause between two keystrokes in humanized mode
    pub fn keystroke_delay(&self) -> Duration {
        let min = self.typing.min_delay_ms;
        let max = self.typing.max_delay_ms.max(min);
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// Browser-driven probe of the registry search form
pub struct RegistryProbe {
    launcher: Arc<dyn SessionLauncher>,
    target: SearchTarget,
    timing: ProbeTiming,
    classifier: PageClassifier,
}

impl RegistryProbe {
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        target: SearchTarget,
        timing: ProbeTiming,
        classifier: PageClassifier,
    ) -> Self {
        Self {
            launcher,
            target,
            timing,
            classifier,
        }
    }

    pub fn from_config(launcher: Arc<dyn SessionLauncher>, config: &ProbeConfig) -> Self {
        Self::new(
            launcher,
            SearchTarget::from_config(config),
            ProbeTiming::from_config(config),
            PageClassifier::from_config(config),
        )
    }

    /// Single probe, surfacing the failure
    pub async fn try_check(&self, brand: &str) -> Result<AvailabilitySignal, ProbeFailure> {
        let mut session = self.launcher.launch().await?;
        let outcome = self.drive(session.as_mut(), brand).await;
        session.close().await;
        outcome
    }

    async fn drive(
        &self,
        session: &mut dyn SearchSession,
        brand: &str,
    ) -> Result<AvailabilitySignal, ProbeFailure> {
        let started = Instant::now();

        match timeout(self.timing.page_load_timeout, session.open(&self.target.url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ProbeFailure::Timeout {
                    stage: "page load",
                    duration_ms: self.timing.page_load_timeout.as_millis() as u64,
                })
            }
        }
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "search form loaded");

        self.wait_for_input(session).await?;
        self.enter_brand(session, brand).await?;
        session.click(&self.target.button_id).await?;

        let settle = self.timing.settle_delay();
        debug!(settle_ms = settle.as_millis() as u64, "search submitted, settling");
        sleep(settle).await;

        let html = session.content().await?;
        Ok(self.classifier.classify(&html))
    }

    async fn wait_for_input(&self, session: &mut dyn SearchSession) -> Result<(), ProbeFailure> {
        let deadline = Instant::now() + self.timing.input_wait;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match timeout(remaining, session.has_input(&self.target.input_name)).await {
                Ok(Ok(true)) => return Ok(()),
                Ok(Ok(false)) => {}
                Ok(Err(e)) => return Err(e),
                Err(_) => break,
            }

            if Instant::now() + self.timing.input_poll >= deadline {
                break;
            }
            sleep(self.timing.input_poll).await;
        }

        Err(ProbeFailure::Timeout {
            stage: "input wait",
            duration_ms: self.timing.input_wait.as_millis() as u64,
        })
    }

    async fn enter_brand(
        &self,
        session: &mut dyn SearchSession,
        brand: &str,
    ) -> Result<(), ProbeFailure> {
        match self.timing.typing.mode {
            TypingMode::Instant => session.type_into(&self.target.input_name, brand).await,
            TypingMode::Humanized => {
                let mut buf = [0u8; 4];
                for ch in brand.chars() {
                    session
                        .type_into(&self.target.input_name, ch.encode_utf8(&mut buf))
                        .await?;
                    sleep(self.timing.keystroke_delay()).await;
                }
                Ok(())
            }
        }
    }
}

#[async_trait]
impl AvailabilityProbe for RegistryProbe {
    async fn check_availability(&self, brand: &str) -> AvailabilitySignal {
        let started = Instant::now();
        match self.try_check(brand).await {
            Ok(signal) => {
                info!(
                    %signal,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "registry probe finished"
                );
                signal
            }
            Err(e) => {
                warn!(
                    kind = e.kind(),
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "registry probe failed"
                );
                AvailabilitySignal::ConnectionError
            }
        }
    }
}

/// Probe used when the registry check is switched off
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledProbe;

#[async_trait]
impl AvailabilityProbe for DisabledProbe {
    async fn check_availability(&self, _brand: &str) -> AvailabilitySignal {
        info!("registry probe disabled");
        AvailabilitySignal::ConnectionError
    }
}
