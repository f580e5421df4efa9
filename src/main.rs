use anyhow::{Context, Result};
use pixel_loadgen::{config, driver, settings, stats, telemetry, transport};
use config::Config;
use driver::LoadDriver;
use settings::SettingsClient;
use stats::{LogSink, StatsReporter};
use std::sync::Arc;
use std::time::Instant;
use telemetry::init_tracing;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use transport::HttpTransport;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cfg = Config::load().context("failed to load configuration")?;
    init_tracing(cfg.log_format);

    let transport = HttpTransport::new(cfg.target.request_timeout())
        .context("failed to build HTTP client")?;

    let endpoint = if cfg.settings.enabled {
        SettingsClient::new(
            transport.client().clone(),
            cfg.settings.url.clone(),
            cfg.settings.timeout(),
        )
        .resolve_endpoint(&cfg.target.default_endpoint)
        .await
    } else {
        cfg.target.default_endpoint.clone()
    };
    let url = driver::target_url(&cfg.target.base_url, &endpoint)?;

    let driver = LoadDriver::new(&cfg, Arc::new(transport), url);
    let shutdown = CancellationToken::new();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        telemetry::shutdown_signal().await;
        signal_token.cancel();
    });

    let reporter = StatsReporter::new(
        driver.counter(),
        cfg.stats.report_interval(),
        Arc::new(LogSink),
    );
    let reporter_task = tokio::spawn(reporter.run(shutdown.clone()));
    info!("warming up");

    let started = Instant::now();
    driver.run(shutdown).await;
    if let Err(e) = reporter_task.await {
        warn!(error = %e, "stats reporter panicked");
    }

    driver.counter().totals().log_summary(started.elapsed());
    warn!("load test stopped");
    Ok(())
}
