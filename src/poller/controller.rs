use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::alert::AlertSink;
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::pipeline::{MonitorHandle, Pipeline};
use crate::snapshot::SnapshotSource;

use super::loop_worker::{poll_loop, Pacing};

#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub id: String,
    pub started_at: DateTime<Utc>,
}

/// Owns the poll task of the current monitoring session.
pub struct SessionController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    session: Option<SessionInfo>,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
            session: None,
        }
    }

    /// Validates `config` and spawns a poll loop over fresh session state.
    pub fn start<S: SnapshotSource>(
        &mut self,
        source: S,
        config: &MonitorConfig,
        alerts: Arc<dyn AlertSink>,
    ) -> Result<MonitorHandle> {
        if self.handle.is_some() {
            bail!("monitoring session already active");
        }

        config
            .validate()
            .map_err(MonitorError::from)
            .context("refusing to start monitoring session")?;

        let monitor = MonitorHandle::new(Pipeline::new(config, Instant::now()));
        let cancel_token = CancellationToken::new();
        let session = SessionInfo {
            id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
        };
        info!(
            "monitoring session {} started against {}",
            session.id, config.endpoint
        );

        let handle = tokio::spawn(poll_loop(
            source,
            monitor.clone(),
            alerts,
            Pacing::from_config(config),
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.session = Some(session);
        Ok(monitor)
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(session) = self.session.take() {
            info!("monitoring session {} stopping", session.id);
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("poll loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }

    /// Stops the current session, if any, and starts a new one. History,
    /// trail, alert state and metrics all start empty.
    pub async fn restart<S: SnapshotSource>(
        &mut self,
        source: S,
        config: &MonitorConfig,
        alerts: Arc<dyn AlertSink>,
    ) -> Result<MonitorHandle> {
        self.stop().await?;
        self.start(source, config, alerts)
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn session(&self) -> Option<&SessionInfo> {
        self.session.as_ref()
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}
