use std::time::Duration;

use reqwest::{Client, Url};

use super::{SnapshotPayload, SnapshotSource};
use crate::error::{ConfigError, FetchError, MonitorError};

/// Pulls snapshots from the telemetry backend's `/data` endpoint.
#[derive(Clone)]
pub struct HttpSnapshotSource {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpSnapshotSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, MonitorError> {
        let endpoint = parse_endpoint(endpoint)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::from)?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl SnapshotSource for HttpSnapshotSource {
    async fn fetch_snapshot(&self) -> Result<SnapshotPayload, FetchError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|err| classify(err, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| classify(err, self.timeout))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(timeout)
    } else {
        FetchError::Transport(err)
    }
}

pub(crate) fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(endpoint).map_err(|err| ConfigError::Endpoint {
        endpoint: endpoint.to_string(),
        reason: err.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Endpoint {
            endpoint: endpoint.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}
