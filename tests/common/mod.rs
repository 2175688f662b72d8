#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use neurocursor_lib::alert::{Alert, AlertSink};
use neurocursor_lib::error::FetchError;
use neurocursor_lib::snapshot::{SnapshotPayload, SnapshotSource};

/// One scripted answer: wait `after`, then respond or fail.
#[derive(Debug, Clone)]
pub enum Step {
    Respond {
        after: Duration,
        payload: SnapshotPayload,
    },
    Fail {
        after: Duration,
    },
}

pub fn respond(after_ms: u64, payload: SnapshotPayload) -> Step {
    Step::Respond {
        after: Duration::from_millis(after_ms),
        payload,
    }
}

pub fn fail(after_ms: u64) -> Step {
    Step::Fail {
        after: Duration::from_millis(after_ms),
    }
}

/// Plays back a fixed list of steps, then fails every call with HTTP 503.
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    calls: Arc<Mutex<Vec<Instant>>>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> (Self, Arc<Mutex<Vec<Instant>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let source = Self {
            steps: Mutex::new(steps.into()),
            calls: Arc::clone(&calls),
        };
        (source, calls)
    }
}

impl SnapshotSource for ScriptedSource {
    async fn fetch_snapshot(&self) -> Result<SnapshotPayload, FetchError> {
        self.calls.lock().unwrap().push(Instant::now());
        let step = self.steps.lock().unwrap().pop_front();

        match step {
            Some(Step::Respond { after, payload }) => {
                tokio::time::sleep(after).await;
                Ok(payload)
            }
            Some(Step::Fail { after }) => {
                tokio::time::sleep(after).await;
                Err(FetchError::Status(503))
            }
            None => Err(FetchError::Status(503)),
        }
    }
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    alerts: Arc<Mutex<Vec<Alert>>>,
}

impl RecordingSink {
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingSink {
    fn emit(&self, alert: &Alert) {
        self.alerts.lock().unwrap().push(alert.clone());
    }
}

pub fn reading(score: f64, status: &str, x: f64, y: f64, timestamp: f64) -> SnapshotPayload {
    SnapshotPayload {
        score: Some(score),
        status: Some(status.into()),
        efficiency: Some(75.0),
        meters: Some(timestamp / 10.0),
        insight: Some("Steady hand".into()),
        prescription: Some("None.".into()),
        x: Some(x),
        y: Some(y),
        timestamp: Some(timestamp),
    }
}

pub fn gaps_ms(calls: &[Instant]) -> Vec<u64> {
    calls
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).as_millis() as u64)
        .collect()
}
