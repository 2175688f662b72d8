use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::alert::AlertSink;
use crate::config::MonitorConfig;
use crate::pipeline::MonitorHandle;
use crate::snapshot::SnapshotSource;
use crate::state::LinkState;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// While failures persist, only every N-th one is logged.
const FAILURE_LOG_EVERY: u32 = 20;

/// Cadence of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub target_interval: Duration,
    pub failure_backoff: Duration,
    pub fetch_timeout: Duration,
}

impl Pacing {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            target_interval: config.target_interval(),
            failure_backoff: config.failure_backoff(),
            fetch_timeout: config.fetch_timeout(),
        }
    }
}

/// Delay before the next cycle after a successful one: the remainder of the
/// target interval, or zero when the cycle overran it.
pub fn next_delay(target_interval: Duration, elapsed: Duration) -> Duration {
    target_interval.saturating_sub(elapsed)
}

/// Runs fetch cycles until `cancel_token` fires.
///
/// Cycles never overlap: the next one is scheduled only after the current
/// fetch has been processed or has failed. The token is checked before
/// touching the pipeline and before sleeping, so a fetch still in flight at
/// cancellation is dropped unprocessed.
pub async fn poll_loop<S: SnapshotSource>(
    source: S,
    monitor: MonitorHandle,
    alerts: Arc<dyn AlertSink>,
    pacing: Pacing,
    cancel_token: CancellationToken,
) {
    let mut failures: u32 = 0;

    loop {
        let t0 = Instant::now();

        let outcome = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            outcome = tokio::time::timeout(pacing.fetch_timeout, source.fetch_snapshot()) => outcome,
        };

        if cancel_token.is_cancelled() {
            log_debug!("discarding fetch completed after cancellation");
            break;
        }

        let delay = match outcome {
            Ok(Ok(payload)) => {
                if failures > 0 {
                    log_info!("telemetry source reachable again after {} failed fetches", failures);
                    failures = 0;
                }

                let ingested = monitor.ingest(payload, Instant::now());
                if let Some(alert) = ingested.alert {
                    alerts.emit(&alert);
                }
                next_delay(pacing.target_interval, t0.elapsed())
            }
            Ok(Err(err)) => {
                failures = failures.saturating_add(1);
                let link = monitor.record_failure();
                log_failure(failures, link, &err);
                pacing.failure_backoff
            }
            Err(_) => {
                failures = failures.saturating_add(1);
                let link = monitor.record_failure();
                log_failure(
                    failures,
                    link,
                    &format!("no answer within {:?}", pacing.fetch_timeout),
                );
                pacing.failure_backoff
            }
        };

        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    log_info!("poll loop shutting down");
}

fn log_failure(failures: u32, link: LinkState, err: &dyn std::fmt::Display) {
    if failures == 1 || failures % FAILURE_LOG_EVERY == 0 {
        log_warn!("telemetry fetch failed ({} in a row, link {:?}): {}", failures, link, err);
    } else {
        log_debug!("telemetry fetch failed ({} in a row): {}", failures, err);
    }
}
