#![cfg(test)]
//! Sustained Load Suite
//!
//! Longer runs of the driver at production cadence (1s reports):
//! - Healthy target: every interval reports traffic and no errors
//! - Unavailable target: every interval reports errors == requests
//! - High concurrency: the in-flight budget holds with hundreds of workers
//! - Session pool: many short sessions churn through a small pool

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pixel_loadgen::config::Config;
use pixel_loadgen::driver::{target_url, LoadDriver, LoadModel};
use pixel_loadgen::stats::{IntervalReport, ReportSink, StatsReporter};
use pixel_loadgen::transport::{Delivery, EventTransport, HttpTransport, TransportError};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct CollectingSink(Mutex<Vec<IntervalReport>>);

impl ReportSink for CollectingSink {
    fn emit(&self, report: &IntervalReport) {
        println!(
            "rps: {:.0} | errors: {:.0}",
            report.requests_per_sec(),
            report.errors_per_sec()
        );
        self.0.lock().unwrap().push(*report);
    }
}

/// Accepts everything after a short delay and tracks the in-flight peak
#[derive(Default)]
struct GaugedTransport {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl EventTransport for GaugedTransport {
    async fn post(
        &self,
        _url: &str,
        _user_agent: Option<&str>,
        _body: Vec<u8>,
    ) -> Result<Delivery, TransportError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Delivery {
            status: 204,
            body: String::new(),
        })
    }
}

async fn drive(
    cfg: &Config,
    transport: Arc<dyn EventTransport>,
    url: String,
    duration: Duration,
) -> Vec<IntervalReport> {
    let driver = LoadDriver::new(cfg, transport, url);
    let sink = Arc::new(CollectingSink::default());
    let shutdown = CancellationToken::new();

    let reporter = StatsReporter::new(driver.counter(), cfg.stats.report_interval(), sink.clone());
    let reporter_task = tokio::spawn(reporter.run(shutdown.clone()));

    let stopper = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        stopper.cancel();
    });

    driver.run(shutdown).await;
    reporter_task.await.unwrap();

    let reports = sink.0.lock().unwrap().clone();
    reports
}

fn semaphore_config(concurrency: usize) -> Config {
    let mut cfg = Config::default();
    cfg.load.model = LoadModel::Semaphore;
    cfg.load.concurrency = concurrency;
    cfg
}

/// Test: Five seconds against a healthy target
///
/// Concurrency 10, target always answers 200.
#[tokio::test(flavor = "multi_thread")]
#[ignore] // Ignore by default as this is a slow test
async fn test_healthy_target_five_seconds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let cfg = semaphore_config(10);
    let url = target_url(&server.uri(), "/track").unwrap();
    let transport = Arc::new(HttpTransport::new(cfg.target.request_timeout()).unwrap());
    let reports = drive(&cfg, transport, url, Duration::from_millis(5_200)).await;

    assert_eq!(reports.len(), 5, "one report per second");
    for report in &reports {
        assert!(report.requests_per_sec() > 0.0);
        assert_eq!(report.errors, 0);
    }
}

/// Test: Five seconds against a target answering 503
///
/// The driver must keep running and report every request as an error.
#[tokio::test(flavor = "multi_thread")]
#[ignore] // Ignore by default as this is a slow test
async fn test_unavailable_target_five_seconds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let cfg = semaphore_config(10);
    let url = target_url(&server.uri(), "/track").unwrap();
    let transport = Arc::new(HttpTransport::new(cfg.target.request_timeout()).unwrap());
    let reports = drive(&cfg, transport, url, Duration::from_millis(5_200)).await;

    assert_eq!(reports.len(), 5);
    for report in &reports {
        assert!(report.requests > 0);
        assert_eq!(report.errors, report.requests);
    }
}

/// Test: In-flight budget under high concurrency
///
/// 500 workers against an instrumented transport for three seconds.
#[tokio::test(flavor = "multi_thread")]
#[ignore] // Ignore by default as this is a slow test
async fn test_budget_holds_at_high_concurrency() {
    let transport = Arc::new(GaugedTransport::default());
    let cfg = semaphore_config(500);

    let start = Instant::now();
    let reports = drive(
        &cfg,
        transport.clone(),
        "http://load.test/track".to_string(),
        Duration::from_secs(3),
    )
    .await;
    let elapsed = start.elapsed();

    let total: u64 = reports.iter().map(|r| r.requests).sum();
    println!(
        "Throughput: {:.0} req/s ({} requests in {:?}), peak in-flight {}",
        total as f64 / elapsed.as_secs_f64(),
        total,
        elapsed,
        transport.peak.load(Ordering::SeqCst)
    );

    assert!(transport.peak.load(Ordering::SeqCst) <= 500);
    assert!(total > 1_000, "throughput too low: {total} requests");
}

/// Test: Session churn through a small pool
///
/// Sessions of 1..5 events with no pauses keep cycling through 5 slots.
#[tokio::test(flavor = "multi_thread")]
#[ignore] // Ignore by default as this is a slow test
async fn test_session_pool_churn() {
    let transport = Arc::new(GaugedTransport::default());
    let mut cfg = Config::default();
    cfg.load.model = LoadModel::SessionPool;
    cfg.load.concurrency = 5;
    cfg.load.session_min_events = 1;
    cfg.load.session_max_events = 5;
    cfg.load.submit_interval_min_ms = 0;
    cfg.load.submit_interval_max_ms = 0;

    let reports = drive(
        &cfg,
        transport.clone(),
        "http://load.test/track".to_string(),
        Duration::from_millis(3_200),
    )
    .await;

    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.requests > 0 && r.errors == 0));
    // One request per session at a time, so never more than the pool size.
    assert!(transport.peak.load(Ordering::SeqCst) <= 5);
}
