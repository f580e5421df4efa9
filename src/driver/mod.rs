//! # Load Driver
//!
//! Sustains a fixed concurrency budget against the target URL until shutdown.
//!
//! Two models are available and a deployment picks one through `load.model`:
//!
//! - **session_pool**: at most `concurrency` simulated sessions run at once.
//!   Each session sends a random number of events from one user, strictly in
//!   sequence, and ends early on the first connection failure.
//! - **semaphore**: `concurrency` long-lived workers, each sending one event
//!   per permit. Bounds in-flight *requests*; there are no sessions.

pub mod continuous;
pub mod request;
pub mod session_pool;

use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use strum::Display;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{Config, LoadConfig, PayloadConfig};
use crate::payload::PayloadSynthesizer;
use crate::stats::ThroughputCounter;
use crate::transport::EventTransport;

pub use request::{EventSender, Outcome};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoadModel {
    /// Bounds concurrent sessions
    SessionPool,
    /// Bounds concurrent in-flight requests
    #[default]
    Semaphore,
}

/// Inclusive millisecond range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms,
            max_ms: max_ms.max(min_ms),
        }
    }

    pub fn sample(&self) -> Duration {
        if self.max_ms == self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..=self.max_ms))
    }
}

/// Sleep unless shutdown comes first; `false` means stop.
///
/// A zero pause still yields so tight loops stay cooperative.
pub(crate) async fn pause(duration: Duration, shutdown: &CancellationToken) -> bool {
    if duration.is_zero() {
        tokio::task::yield_now().await;
        return !shutdown.is_cancelled();
    }
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

/// Join base URL and endpoint path, rejecting anything that does not parse
pub fn target_url(base_url: &str, endpoint: &str) -> Result<String> {
    let url = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    );
    reqwest::Url::parse(&url).with_context(|| format!("invalid target URL {url}"))?;
    Ok(url)
}

pub struct LoadDriver {
    load: LoadConfig,
    payload: PayloadConfig,
    sender: Arc<EventSender>,
    counter: Arc<ThroughputCounter>,
}

impl LoadDriver {
    pub fn new(cfg: &Config, transport: Arc<dyn EventTransport>, url: String) -> Self {
        let counter = Arc::new(ThroughputCounter::new());
        let sender = Arc::new(EventSender::new(
            transport,
            url,
            cfg.payload.schema,
            cfg.payload.spoof_user_agent,
            counter.clone(),
        ));

        Self {
            load: cfg.load.clone(),
            payload: cfg.payload.clone(),
            sender,
            counter,
        }
    }

    pub fn counter(&self) -> Arc<ThroughputCounter> {
        self.counter.clone()
    }

    /// Synthesizer for the `n`th worker or session; seeded runs stay reproducible
    fn synthesizer(&self, n: u64) -> PayloadSynthesizer {
        let seed = self.payload.seed.map(|s| s.wrapping_add(n));
        PayloadSynthesizer::new(&self.payload, seed)
    }

    fn delay(&self) -> DelayRange {
        DelayRange::new(self.load.delay_min_ms, self.load.delay_max_ms)
    }

    /// Run the configured model until `shutdown` is cancelled
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(
            target_url = self.sender.url(),
            model = %self.load.model,
            concurrency = self.load.concurrency,
            schema = %self.payload.schema,
            "starting load test, press Ctrl+C to stop"
        );

        match self.load.model {
            LoadModel::SessionPool => session_pool::run(self, shutdown).await,
            LoadModel::Semaphore => continuous::run(self, shutdown).await,
        }

        info!("load driver stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_url_join() {
        assert_eq!(
            target_url("http://localhost:8081", "/track").unwrap(),
            "http://localhost:8081/track"
        );
        assert_eq!(
            target_url("http://localhost:8081/", "collect").unwrap(),
            "http://localhost:8081/collect"
        );
        assert!(target_url("localhost", "/track").is_err());
    }

    #[test]
    fn test_delay_range_sample() {
        let fixed = DelayRange::new(250, 250);
        assert_eq!(fixed.sample(), Duration::from_millis(250));

        let range = DelayRange::new(100, 2_000);
        for _ in 0..1_000 {
            let d = range.sample();
            assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(2_000));
        }

        // inverted input collapses to the minimum
        assert_eq!(DelayRange::new(300, 10).sample(), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_pause_stops_on_shutdown() {
        let shutdown = CancellationToken::new();
        assert!(pause(Duration::ZERO, &shutdown).await);
        shutdown.cancel();
        assert!(!pause(Duration::ZERO, &shutdown).await);
        assert!(!pause(Duration::from_secs(60), &shutdown).await);
    }

    #[test]
    fn test_model_names() {
        assert_eq!(LoadModel::SessionPool.to_string(), "session_pool");
        assert_eq!(LoadModel::Semaphore.to_string(), "semaphore");
    }
}
