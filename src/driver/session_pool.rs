//! Bounded pool of simulated user sessions.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::{pause, DelayRange, EventSender, LoadDriver, Outcome};
use crate::payload::PayloadSynthesizer;

pub(super) async fn run(driver: &LoadDriver, shutdown: CancellationToken) {
    let slots = Arc::new(Semaphore::new(driver.load.concurrency));
    let submit_interval = DelayRange::new(
        driver.load.submit_interval_min_ms,
        driver.load.submit_interval_max_ms,
    );
    let tracker = TaskTracker::new();
    let mut submitted: u64 = 0;

    loop {
        // A new session starts only once a slot is free.
        let slot = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            slot = slots.clone().acquire_owned() => match slot {
                Ok(slot) => slot,
                Err(_) => break,
            },
        };

        let session = Session {
            sender: driver.sender.clone(),
            synth: driver.synthesizer(submitted),
            events: (driver.load.session_min_events, driver.load.session_max_events),
            delay: driver.delay(),
        };
        let session_shutdown = shutdown.clone();
        tracker.spawn(async move {
            session.run(session_shutdown).await;
            drop(slot);
        });
        submitted += 1;

        if !pause(submit_interval.sample(), &shutdown).await {
            break;
        }
    }

    tracker.close();
    tracker.wait().await;
    debug!(sessions = submitted, "session pool drained");
}

/// Result of one session, mostly for tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub planned: usize,
    pub sent: usize,
    pub aborted: bool,
}

pub(crate) struct Session {
    pub(crate) sender: Arc<EventSender>,
    pub(crate) synth: PayloadSynthesizer,
    /// Inclusive (min, max) number of events
    pub(crate) events: (usize, usize),
    pub(crate) delay: DelayRange,
}

impl Session {
    pub(crate) async fn run(mut self, shutdown: CancellationToken) -> SessionReport {
        let user = self.synth.user();
        let planned = self.synth.session_length(self.events.0, self.events.1);
        let session = user.short_id();
        info!(%session, events = planned, "session started");

        let mut report = SessionReport {
            planned,
            sent: 0,
            aborted: false,
        };

        for _ in 0..planned {
            let event = self.synth.event(&user);
            let outcome = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    report.aborted = true;
                    return report;
                }
                outcome = self.sender.send(&event) => outcome,
            };

            if outcome == Outcome::Failed {
                warn!(%session, "connection failed, ending session early");
                report.aborted = true;
                break;
            }
            report.sent += 1;

            if !pause(self.delay.sample(), &shutdown).await {
                report.aborted = true;
                return report;
            }
        }

        info!(%session, sent = report.sent, "session finished");
        report
    }
}
