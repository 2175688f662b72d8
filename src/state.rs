use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::MetricsSnapshot;

/// Latest reading as shown on the dashboard.
#[derive(Debug, Clone, Default)]
pub struct MetricsState {
    current: MetricsSnapshot,
    updated_at: Option<DateTime<Utc>>,
    samples_received: u64,
}

impl MetricsState {
    pub fn apply(&mut self, snapshot: MetricsSnapshot) {
        self.current = snapshot;
        self.updated_at = Some(Utc::now());
        self.samples_received += 1;
    }

    pub fn current(&self) -> &MetricsSnapshot {
        &self.current
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn samples_received(&self) -> u64 {
        self.samples_received
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum LinkState {
    /// No successful fetch yet this session.
    #[default]
    Connecting,
    Live,
    /// Sustained failures after having been live.
    Offline,
}

/// Connection health as seen by the poll loop. Failures touch only this,
/// never the metrics themselves.
#[derive(Debug, Clone)]
pub struct LinkHealth {
    state: LinkState,
    consecutive_failures: u32,
    offline_after: u32,
}

impl LinkHealth {
    pub fn new(offline_after: u32) -> Self {
        Self {
            state: LinkState::Connecting,
            consecutive_failures: 0,
            offline_after,
        }
    }

    pub fn record_success(&mut self) -> LinkState {
        self.consecutive_failures = 0;
        self.state = LinkState::Live;
        self.state
    }

    pub fn record_failure(&mut self) -> LinkState {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if self.state == LinkState::Live && self.consecutive_failures >= self.offline_after {
            self.state = LinkState::Offline;
        }
        self.state
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_connecting_until_first_success() {
        let mut link = LinkHealth::new(3);
        assert_eq!(link.state(), LinkState::Connecting);
        for _ in 0..10 {
            assert_eq!(link.record_failure(), LinkState::Connecting);
        }
        assert_eq!(link.record_success(), LinkState::Live);
        assert_eq!(link.consecutive_failures(), 0);
    }

    #[test]
    fn goes_offline_after_sustained_failures() {
        let mut link = LinkHealth::new(3);
        link.record_success();
        assert_eq!(link.record_failure(), LinkState::Live);
        assert_eq!(link.record_failure(), LinkState::Live);
        assert_eq!(link.record_failure(), LinkState::Offline);
        assert_eq!(link.record_success(), LinkState::Live);
    }

    #[test]
    fn zero_threshold_goes_offline_on_first_failure() {
        let mut link = LinkHealth::new(0);
        link.record_success();
        assert_eq!(link.record_failure(), LinkState::Offline);
    }

    #[test]
    fn applying_a_snapshot_replaces_it() {
        let mut state = MetricsState::default();
        assert!(state.updated_at().is_none());

        let snapshot = MetricsSnapshot {
            score: 42,
            ..Default::default()
        };
        state.apply(snapshot.clone());
        assert_eq!(state.current(), &snapshot);
        assert_eq!(state.samples_received(), 1);
        assert!(state.updated_at().is_some());
    }
}
