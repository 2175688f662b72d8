//! Read-only view-model for whatever draws the dashboard.

use serde::Serialize;

use crate::snapshot::{MetricsSnapshot, Status};
use crate::state::LinkState;

const GREY: &str = "#888888";
const DIM: &str = "#444444";
const GREEN: &str = "#00ff00";
const RED: &str = "#ff4444";

/// Efficiency above this reads as flow state.
const FLOW_ABOVE: u8 = 80;
/// Efficiency below this is colored as a problem.
const FOCUS_WARN_BELOW: u8 = 60;

const STATUS_COLORS: [(Status, &str); 3] = [
    (Status::Calm, "#00ff00"),
    (Status::Fatigue, "#ffff00"),
    (Status::Tremor, "#ff0000"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub status_label: &'static str,
    pub status_color: &'static str,
    pub score: u8,
    pub efficiency: u8,
    pub efficiency_label: &'static str,
    pub efficiency_color: &'static str,
    pub meters: f64,
    pub insight: String,
    pub prescription: String,
    pub needs_action: bool,
    pub link: LinkState,
    pub history_len: usize,
}

impl DashboardView {
    pub fn build(snapshot: &MetricsSnapshot, link: LinkState, history_len: usize) -> Self {
        let (status_label, status_color) = if link == LinkState::Live {
            (snapshot.status.as_str(), status_color(snapshot.status))
        } else {
            ("CONNECTING", GREY)
        };

        Self {
            status_label,
            status_color,
            score: snapshot.score,
            efficiency: snapshot.efficiency,
            efficiency_label: efficiency_label(snapshot.efficiency),
            efficiency_color: efficiency_color(snapshot.efficiency),
            meters: snapshot.meters,
            insight: snapshot.insight.clone(),
            prescription: snapshot.prescription.clone(),
            needs_action: snapshot.needs_action(),
            link,
            history_len,
        }
    }

    pub fn summary_line(&self) -> String {
        let action = if self.needs_action {
            format!("ACTION: {}", self.prescription)
        } else {
            "System optimal".to_string()
        };
        format!(
            "[{}] stability {:>3} | focus {:>3}% {} | travel {:.2} m | {} | {}",
            self.status_label,
            self.score,
            self.efficiency,
            self.efficiency_label,
            self.meters,
            self.insight,
            action,
        )
    }
}

pub fn status_color(status: Status) -> &'static str {
    STATUS_COLORS
        .iter()
        .find(|(s, _)| *s == status)
        .map(|(_, color)| *color)
        .unwrap_or(GREY)
}

pub fn efficiency_label(efficiency: u8) -> &'static str {
    match efficiency {
        0 => "IDLE",
        e if e > FLOW_ABOVE => "FLOW STATE",
        _ => "DISTRACTED",
    }
}

pub fn efficiency_color(efficiency: u8) -> &'static str {
    match efficiency {
        0 => DIM,
        e if e < FOCUS_WARN_BELOW => RED,
        _ => GREEN,
    }
}
