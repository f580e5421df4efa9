//! Semaphore-gated continuous workers.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::debug;

use super::{pause, DelayRange, EventSender, LoadDriver, Outcome};
use crate::payload::PayloadSynthesizer;

pub(super) async fn run(driver: &LoadDriver, shutdown: CancellationToken) {
    let concurrency = driver.load.concurrency;
    let permits = Arc::new(Semaphore::new(concurrency));
    let tracker = TaskTracker::new();

    for id in 0..concurrency {
        let worker = Worker {
            id,
            sender: driver.sender.clone(),
            synth: driver.synthesizer(id as u64),
            permits: permits.clone(),
            delay: driver.delay(),
            error_backoff: driver.load.error_backoff(),
        };
        tracker.spawn(worker.run(shutdown.clone()));
    }
    tracker.close();

    tracker.wait().await;
    debug!(workers = concurrency, "all workers stopped");
}

struct Worker {
    id: usize,
    sender: Arc<EventSender>,
    synth: PayloadSynthesizer,
    permits: Arc<Semaphore>,
    delay: DelayRange,
    error_backoff: Duration,
}

impl Worker {
    async fn run(mut self, shutdown: CancellationToken) {
        loop {
            let user = self.synth.user();
            let event = self.synth.event(&user);

            let permit = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                permit = self.permits.acquire() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };
            // In-flight requests are abandoned on shutdown.
            let outcome = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                outcome = self.sender.send(&event) => outcome,
            };
            drop(permit);

            let mut wait = self.delay.sample();
            if outcome == Outcome::Failed {
                wait += self.error_backoff;
            }
            if !pause(wait, &shutdown).await {
                break;
            }
        }
        debug!(worker = self.id, "worker stopped");
    }
}
