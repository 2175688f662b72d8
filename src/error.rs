//! Error taxonomy for the monitor.
//!
//! Fetch failures never leave the poll loop; configuration errors stop a
//! session before it starts; a detached render target only skips drawing.

use std::time::Duration;
use thiserror::Error;

/// A single failed pull from the snapshot source. Always transient.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("source answered with HTTP {0}")]
    Status(u16),

    #[error("no answer within {0:?}")]
    Timeout(Duration),

    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Rejected construction parameters.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("distance band ({min}, {max}) must satisfy 0 <= min < max")]
    DistanceBand { min: f64, max: f64 },

    #[error("{what} dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions {
        what: &'static str,
        width: f64,
        height: f64,
    },

    #[error("decay alpha must lie in (0, 1], got {0}")]
    DecayAlpha(f32),

    #[error("{0} thresholds must be strictly ascending")]
    ThresholdOrder(&'static str),

    #[error("{0} thresholds must name at least one band")]
    EmptyThresholds(&'static str),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("failure backoff {backoff_ms}ms is shorter than the target interval {target_ms}ms")]
    BackoffTooShort { backoff_ms: u64, target_ms: u64 },

    #[error("history capacity {capacity} exceeds the maximum of {max}")]
    HistoryCapacity { capacity: usize, max: usize },

    #[error("line width must be at least 1")]
    LineWidth,

    #[error("invalid endpoint {endpoint:?}: {reason}")]
    Endpoint { endpoint: String, reason: String },
}

/// Top-level error for the monitor library.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("trail render target is not attached")]
    RenderTargetUnavailable,
}

pub type Result<T> = std::result::Result<T, MonitorError>;
