use serde::{Deserialize, Serialize};

use super::types::{MetricsSnapshot, Position, Status};
use crate::bands::StatusTable;

/// Body of one `/data` answer. Deployments differ in which fields they send,
/// so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub meters: Option<f64>,
    #[serde(default)]
    pub efficiency: Option<f64>,
    #[serde(default)]
    pub insight: Option<String>,
    #[serde(default)]
    pub prescription: Option<String>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

impl SnapshotPayload {
    /// Builds the next snapshot. Missing fields keep `prior`'s value, except:
    /// - `status` is derived from this payload's score via `statuses`;
    /// - `timestamp` falls back to `fallback_tick`.
    pub fn resolve(
        self,
        prior: &MetricsSnapshot,
        statuses: &StatusTable,
        fallback_tick: f64,
    ) -> MetricsSnapshot {
        let score = self.score.map(clamp_percent).unwrap_or(prior.score);
        let status = match self.status {
            Some(label) => Status::from_label(&label),
            None => *statuses.lookup(score),
        };

        MetricsSnapshot {
            score,
            status,
            efficiency: self.efficiency.map(clamp_percent).unwrap_or(prior.efficiency),
            meters: self
                .meters
                .filter(|m| m.is_finite())
                .map(|m| m.max(0.0))
                .unwrap_or(prior.meters),
            insight: self.insight.unwrap_or_else(|| prior.insight.clone()),
            prescription: self
                .prescription
                .unwrap_or_else(|| prior.prescription.clone()),
            position: Position {
                x: self.x.unwrap_or(prior.position.x),
                y: self.y.unwrap_or(prior.position.y),
            },
            timestamp: self.timestamp.unwrap_or(fallback_tick),
        }
    }
}

fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
