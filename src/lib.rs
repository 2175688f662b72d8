pub mod alert;
pub mod bands;
pub mod config;
pub mod display;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod poller;
pub mod snapshot;
pub mod state;
pub mod trail;
mod utils;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

use alert::{AlertSink, AudioAlertSink, LogAlertSink};
use config::MonitorConfig;
use error::MonitorError;
use pipeline::MonitorHandle;
use poller::SessionController;
use snapshot::HttpSnapshotSource;

/// Runs one monitoring session against the configured endpoint until Ctrl-C.
pub async fn run() -> Result<()> {
    // RUST_LOG wins over the default level.
    let level = if config::debug_enabled() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    log::info!("NeuroCursor starting up...");

    let config = MonitorConfig::from_env()?;
    config
        .validate()
        .map_err(MonitorError::from)
        .context("invalid monitor configuration")?;

    let source = HttpSnapshotSource::new(&config.endpoint, config.fetch_timeout())?;
    let alerts: Arc<dyn AlertSink> = if config.audio_alerts {
        Arc::new(AudioAlertSink::new())
    } else {
        Arc::new(LogAlertSink)
    };

    let mut controller = SessionController::new();
    let monitor = controller.start(source, &config, alerts)?;

    let presented = present(&monitor, &config).await;
    controller.stop().await?;
    log::info!("NeuroCursor stopped");
    presented
}

/// Console dashboard: one summary line per refresh, plus the trail image when
/// a path is configured.
async fn present(monitor: &MonitorHandle, config: &MonitorConfig) -> Result<()> {
    let mut ticker = tokio::time::interval(config.refresh_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                log::info!("{}", monitor.dashboard().summary_line());

                if let Some(path) = config.trail_png_path.clone() {
                    let monitor = monitor.clone();
                    let written = tokio::task::spawn_blocking(move || monitor.save_trail_png(&path))
                        .await
                        .context("trail image worker join failed")?;
                    if let Err(err) = written {
                        log::warn!("{err:#}");
                    }
                }
            }
            result = &mut shutdown => {
                result.context("failed to listen for Ctrl-C")?;
                log::info!("shutdown requested");
                return Ok(());
            }
        }
    }
}
