use anyhow::{Context, Result};
use image::{ImageFormat, RgbImage};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::time::Instant;

use crate::alert::{Alert, AlertState, AlertThrottler};
use crate::bands::StatusTable;
use crate::config::MonitorConfig;
use crate::display::DashboardView;
use crate::history::{HistoryBuffer, HistorySample};
use crate::snapshot::{MetricsSnapshot, SnapshotPayload};
use crate::state::{LinkHealth, LinkState, MetricsState};
use crate::trail::{Stroke, TrailRenderer};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Result of feeding one payload through the pipeline.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub snapshot: MetricsSnapshot,
    /// `None` when the trail surface is detached.
    pub stroke: Option<Stroke>,
    pub alert: Option<Alert>,
}

/// The per-session consumers of successful snapshots. Each piece of state is
/// owned here and changed only by `ingest` and `record_failure`.
pub struct Pipeline {
    metrics: MetricsState,
    history: HistoryBuffer,
    trail: TrailRenderer,
    alerts: AlertThrottler,
    link: LinkHealth,
    statuses: StatusTable,
    session_start: Instant,
}

impl Pipeline {
    /// Expects a validated config.
    pub fn new(config: &MonitorConfig, session_start: Instant) -> Self {
        Self {
            metrics: MetricsState::default(),
            history: HistoryBuffer::new(config.history_capacity),
            trail: TrailRenderer::new(config),
            alerts: AlertThrottler::new(config.alert_cooldown()),
            link: LinkHealth::new(config.offline_after_failures),
            statuses: config.status_thresholds.clone(),
            session_start,
        }
    }

    pub fn ingest(&mut self, payload: SnapshotPayload, now: Instant) -> Ingested {
        let session_tick = now.saturating_duration_since(self.session_start).as_secs_f64();
        let snapshot = payload.resolve(self.metrics.current(), &self.statuses, session_tick);

        self.link.record_success();
        self.history.append(HistorySample {
            time: snapshot.timestamp,
            score: snapshot.score,
        });
        let stroke = match self.trail.render(snapshot.position, snapshot.score) {
            Ok(stroke) => Some(stroke),
            Err(err) => {
                log_debug!("trail not drawn: {err}");
                None
            }
        };
        let alert = self
            .alerts
            .on_status_update(snapshot.status, snapshot.score, now);
        self.metrics.apply(snapshot.clone());

        Ingested {
            snapshot,
            stroke,
            alert,
        }
    }

    pub fn record_failure(&mut self) -> LinkState {
        self.link.record_failure()
    }

    pub fn metrics(&self) -> &MetricsState {
        &self.metrics
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn trail(&self) -> &TrailRenderer {
        &self.trail
    }

    pub fn trail_mut(&mut self) -> &mut TrailRenderer {
        &mut self.trail
    }

    pub fn alert_state(&self) -> AlertState {
        self.alerts.state()
    }

    pub fn link(&self) -> &LinkHealth {
        &self.link
    }

    pub fn dashboard(&self) -> DashboardView {
        DashboardView::build(self.metrics.current(), self.link.state(), self.history.len())
    }
}

/// Shared handle to a session's pipeline. Presentation code only gets the
/// read accessors; the poll loop is the single writer.
#[derive(Clone)]
pub struct MonitorHandle {
    inner: Arc<RwLock<Pipeline>>,
}

impl MonitorHandle {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            inner: Arc::new(RwLock::new(pipeline)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Pipeline> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Pipeline> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn ingest(&self, payload: SnapshotPayload, now: Instant) -> Ingested {
        self.write().ingest(payload, now)
    }

    pub(crate) fn record_failure(&self) -> LinkState {
        self.write().record_failure()
    }

    pub fn current_metrics(&self) -> MetricsSnapshot {
        self.read().metrics().current().clone()
    }

    pub fn history_snapshot(&self) -> Vec<HistorySample> {
        self.read().history().snapshot()
    }

    /// Copy of the trail image, or `None` when the surface is detached.
    pub fn raster_surface(&self) -> Option<RgbImage> {
        self.read().trail().surface().cloned()
    }

    pub fn link_state(&self) -> LinkState {
        self.read().link().state()
    }

    pub fn alert_state(&self) -> AlertState {
        self.read().alert_state()
    }

    pub fn samples_received(&self) -> u64 {
        self.read().metrics().samples_received()
    }

    pub fn dashboard(&self) -> DashboardView {
        self.read().dashboard()
    }

    /// Writes the trail as PNG. Returns `false` when there is no surface to write.
    pub fn save_trail_png(&self, path: &Path) -> Result<bool> {
        let Some(surface) = self.raster_surface() else {
            return Ok(false);
        };
        surface
            .save_with_format(path, ImageFormat::Png)
            .with_context(|| format!("Failed to write trail image to {}", path.display()))?;
        Ok(true)
    }
}
