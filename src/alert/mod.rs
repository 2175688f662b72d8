pub mod audio;
pub mod chime;
pub mod throttler;

pub use audio::AudioAlertSink;
pub use throttler::{AlertState, AlertThrottler};

use tokio::time::Instant;

use crate::snapshot::Status;

pub const TREMOR_MESSAGE: &str = "Tremor detected. Take a break.";

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub status: Status,
    pub score: u8,
    pub message: &'static str,
    pub at: Instant,
}

impl Alert {
    pub fn tremor(score: u8, at: Instant) -> Self {
        Self {
            status: Status::Tremor,
            score,
            message: TREMOR_MESSAGE,
            at,
        }
    }
}

/// Destination for alerts that passed the throttler. Implementations must not block.
pub trait AlertSink: Send + Sync {
    fn emit(&self, alert: &Alert);
}

/// Writes alerts to the log only.
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn emit(&self, alert: &Alert) {
        log::warn!("ALERT ({}, score {}): {}", alert.status.as_str(), alert.score, alert.message);
    }
}
