use serde::{Deserialize, Serialize};

/// Prescriptions meaning "no action required".
pub const NO_ACTION_PRESCRIPTIONS: [&str; 2] = ["None.", "Maintain current workflow."];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Calm,
    Fatigue,
    Tremor,
    #[default]
    Unknown,
}

impl Status {
    /// Lenient parse of the source's status label. Anything unrecognised is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "CALM" => Status::Calm,
            "FATIGUE" => Status::Fatigue,
            "TREMOR" => Status::Tremor,
            _ => Status::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Calm => "CALM",
            Status::Fatigue => "FATIGUE",
            Status::Tremor => "TREMOR",
            Status::Unknown => "UNKNOWN",
        }
    }
}

/// Raw coordinate in the source's reference frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One complete reading, after defaulting and clamping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsSnapshot {
    pub score: u8,
    pub status: Status,
    /// 0 means idle, not measured.
    pub efficiency: u8,
    pub meters: f64,
    pub insight: String,
    pub prescription: String,
    pub position: Position,
    pub timestamp: f64,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            score: 0,
            status: Status::Unknown,
            efficiency: 0,
            meters: 0.0,
            insight: "Calibrating...".into(),
            prescription: "Analyzing...".into(),
            position: Position::default(),
            timestamp: 0.0,
        }
    }
}

impl MetricsSnapshot {
    pub fn needs_action(&self) -> bool {
        !NO_ACTION_PRESCRIPTIONS.contains(&self.prescription.as_str())
    }

    pub fn is_idle(&self) -> bool {
        self.efficiency == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_parse_leniently() {
        assert_eq!(Status::from_label("TREMOR"), Status::Tremor);
        assert_eq!(Status::from_label(" calm "), Status::Calm);
        assert_eq!(Status::from_label("Fatigue"), Status::Fatigue);
        assert_eq!(Status::from_label("INITIALIZING..."), Status::Unknown);
    }

    #[test]
    fn prescription_sentinels_need_no_action() {
        let mut snapshot = MetricsSnapshot {
            prescription: "None.".into(),
            ..Default::default()
        };
        assert!(!snapshot.needs_action());

        snapshot.prescription = "Maintain current workflow.".into();
        assert!(!snapshot.needs_action());

        snapshot.prescription = "Take a 5 minute break.".into();
        assert!(snapshot.needs_action());
    }

    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_string(&Status::Tremor).unwrap();
        assert_eq!(json, "\"TREMOR\"");
    }
}
