use std::sync::Arc;

use anyhow::Result;
use hostwatch::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let retry = retry::RetryPolicy::from_config(&app_config.retry);

    let bus = bus::Bus::new(app_config.bus.capacity);
    let system = Arc::new(sources::SystemSource::new());
    let network = Arc::new(sources::NetworkSource::new(&app_config.probes));
    let fswatch = Arc::new(sources::FsWatchSource::new(&app_config.watch.paths));

    let (driver_shutdown_tx, driver_shutdown_rx) = tokio::sync::oneshot::channel();
    let driver_handle = driver::spawn(
        driver::DriverDeps {
            system,
            network,
            fswatch,
            bus: bus.clone(),
            shutdown_rx: driver_shutdown_rx,
        },
        driver::DriverConfig {
            cycle_interval_ms: app_config.monitoring.cycle_interval_ms,
            source_deadline_ms: app_config.monitoring.source_deadline_ms,
            retry: retry.clone(),
            thresholds: app_config.thresholds.clone(),
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
        },
    );

    let (dashboard_shutdown_tx, dashboard_shutdown_rx) = tokio::sync::oneshot::channel();
    let dashboard_handle = consumers::dashboard::spawn(
        bus.subscribe(),
        consumers::dashboard::DashboardConfig {
            refresh_ms: app_config.consumers.dashboard_refresh_ms,
            state_history: app_config.consumers.state_history,
            top_processes: app_config.consumers.top_processes,
        },
        dashboard_shutdown_rx,
    );

    let discovery = Arc::new(discovery::NeighborDiscovery::new(retry));
    let scorer = consumers::scoring::TargetScorer::new(&app_config.scoring);
    let (scoring_shutdown_tx, scoring_shutdown_rx) = tokio::sync::oneshot::channel();
    let scoring_handle = consumers::scoring::spawn(
        bus.subscribe(),
        discovery,
        scorer,
        app_config.consumers.scoring_interval_ms,
        scoring_shutdown_rx,
    );

    tracing::info!(
        cycle_interval_ms = app_config.monitoring.cycle_interval_ms,
        "hostwatch running"
    );

    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable; ctrl-c only");
                tokio::signal::ctrl_c().await?;
                shutdown(
                    driver_shutdown_tx,
                    dashboard_shutdown_tx,
                    scoring_shutdown_tx,
                    driver_handle,
                    dashboard_handle,
                    scoring_handle,
                )
                .await;
                return Ok(());
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    tracing::info!("Received shutdown signal");
    shutdown(
        driver_shutdown_tx,
        dashboard_shutdown_tx,
        scoring_shutdown_tx,
        driver_handle,
        dashboard_handle,
        scoring_handle,
    )
    .await;
    Ok(())
}

async fn shutdown(
    driver_tx: tokio::sync::oneshot::Sender<()>,
    dashboard_tx: tokio::sync::oneshot::Sender<()>,
    scoring_tx: tokio::sync::oneshot::Sender<()>,
    driver_handle: tokio::task::JoinHandle<()>,
    dashboard_handle: tokio::task::JoinHandle<()>,
    scoring_handle: tokio::task::JoinHandle<()>,
) {
    let _ = driver_tx.send(());
    let _ = dashboard_tx.send(());
    let _ = scoring_tx.send(());
    let _ = driver_handle.await;
    let _ = dashboard_handle.await;
    let _ = scoring_handle.await;
}
