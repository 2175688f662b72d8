mod http;
mod payload;
mod types;

pub use http::HttpSnapshotSource;
pub(crate) use http::parse_endpoint;
pub use payload::SnapshotPayload;
pub use types::{MetricsSnapshot, Position, Status, NO_ACTION_PRESCRIPTIONS};

use std::future::Future;

use crate::error::FetchError;

/// Stateless pull of the latest telemetry reading.
///
/// The poll loop is the only caller and never issues overlapping calls.
pub trait SnapshotSource: Send + Sync + 'static {
    fn fetch_snapshot(&self) -> impl Future<Output = Result<SnapshotPayload, FetchError>> + Send;
}
