//! Throughput accounting shared by all workers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

// Per-interval requests live in the high half and errors in the low half so a
// single swap reads and resets both consistently. Each half holds at most
// u32::MAX per interval; an error count past that carries into requests.
const REQUEST_UNIT: u64 = 1 << 32;
const ERROR_UNIT: u64 = 1;
const LOW_MASK: u64 = REQUEST_UNIT - 1;

/// Process-wide request/error counters.
///
/// `requests` counts every response received, `errors` counts rejected
/// responses plus requests that never completed.
#[derive(Debug, Default)]
pub struct ThroughputCounter {
    interval: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
}

impl ThroughputCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Response with status 200 or 204
    pub fn record_accepted(&self) {
        self.interval.fetch_add(REQUEST_UNIT, Ordering::Relaxed);
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Response with any other status
    pub fn record_rejected(&self) {
        let prev = self
            .interval
            .fetch_add(REQUEST_UNIT + ERROR_UNIT, Ordering::Relaxed);
        debug_assert!(prev & LOW_MASK != LOW_MASK, "interval error count overflowed");
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// No response: connection error or timeout
    pub fn record_failed(&self) {
        let prev = self.interval.fetch_add(ERROR_UNIT, Ordering::Relaxed);
        debug_assert!(prev & LOW_MASK != LOW_MASK, "interval error count overflowed");
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Read and zero the counts accumulated since the previous call
    pub fn take_interval(&self, elapsed: Duration) -> IntervalReport {
        let packed = self.interval.swap(0, Ordering::AcqRel);
        IntervalReport {
            requests: packed >> 32,
            errors: packed & LOW_MASK,
            elapsed,
        }
    }

    /// Lifetime totals; never reset
    pub fn totals(&self) -> RunTotals {
        RunTotals {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalReport {
    pub requests: u64,
    pub errors: u64,
    pub elapsed: Duration,
}

impl IntervalReport {
    pub fn requests_per_sec(&self) -> f64 {
        per_sec(self.requests, self.elapsed)
    }

    pub fn errors_per_sec(&self) -> f64 {
        per_sec(self.errors, self.elapsed)
    }
}

fn per_sec(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    count as f64 / secs
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub accepted: u64,
    pub rejected: u64,
    pub failed: u64,
}

impl RunTotals {
    pub fn requests(&self) -> u64 {
        self.accepted + self.rejected
    }

    pub fn errors(&self) -> u64 {
        self.rejected + self.failed
    }

    /// Fraction of attempts that were accepted, 0.0 when nothing was attempted
    pub fn success_rate(&self) -> f64 {
        let attempts = self.accepted + self.rejected + self.failed;
        if attempts == 0 {
            return 0.0;
        }
        self.accepted as f64 / attempts as f64
    }

    pub fn log_summary(&self, elapsed: Duration) {
        let success_rate = format!("{:.2}%", self.success_rate() * 100.0);
        info!(
            requests = self.requests(),
            errors = self.errors(),
            elapsed_secs = elapsed.as_secs(),
            avg_rps = per_sec(self.requests(), elapsed).round() as u64,
            %success_rate,
            "run summary"
        );
    }
}

/// Destination for interval reports
pub trait ReportSink: Send + Sync {
    fn emit(&self, report: &IntervalReport);
}

/// Emits one console line per interval
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn emit(&self, report: &IntervalReport) {
        info!(
            rps = report.requests_per_sec().round() as u64,
            errors = report.errors_per_sec().round() as u64,
            "throughput"
        );
    }
}

/// Background task that drains the counter on a fixed cadence
pub struct StatsReporter {
    counter: Arc<ThroughputCounter>,
    interval: Duration,
    sink: Arc<dyn ReportSink>,
}

impl StatsReporter {
    pub fn new(
        counter: Arc<ThroughputCounter>,
        interval: Duration,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            counter,
            interval: interval.max(Duration::from_millis(1)),
            sink,
        }
    }

    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        let mut last = tokio::time::Instant::now();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                now = ticker.tick() => {
                    let report = self.counter.take_interval(now - last);
                    last = now;
                    self.sink.emit(&report);
                }
            }
        }
    }
}
