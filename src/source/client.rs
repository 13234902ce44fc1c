//! Occupancy backend REST client
//!
//! HTTP client for the backend's `/current`, `/stats` and `/stats/history`
//! endpoints.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{DataSource, SourceError, SourceResult};
use crate::model::{format_iso_date, CurrentBody, HistoryPayload, HourlyAverage, OccupancyReading};

/// Configuration for the HTTP data source
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Base URL of the backend (e.g. "http://localhost:8000")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

/// Backend client used by both controllers
pub struct HttpDataSource {
    client: Client,
    config: HttpSourceConfig,
}

/// Status code and raw body of a completed request
struct RawResponse {
    status: reqwest::StatusCode,
    body: Vec<u8>,
}

impl RawResponse {
    fn into_status_error(self) -> SourceError {
        SourceError::Status {
            status: self.status.as_u16(),
            body: String::from_utf8_lossy(&self.body).into_owned(),
        }
    }
}

impl HttpDataSource {
    /// Create a new client with the given configuration
    pub fn new(mut config: HttpSourceConfig) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        // Normalize: remove trailing slash
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> SourceResult<RawResponse> {
        let url = self.url(path);
        tracing::trace!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(SourceError::from_transport)?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(SourceError::from_transport)?
            .to_vec();

        Ok(RawResponse { status, body })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> SourceResult<T> {
        let raw = self.get(path, &[]).await?;

        if !raw.status.is_success() {
            return Err(raw.into_status_error());
        }

        Ok(serde_json::from_slice(&raw.body)?)
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_current(&self) -> SourceResult<OccupancyReading> {
        let body: CurrentBody = self.get_json("/current").await?;
        Ok(body.into())
    }

    async fn fetch_recent_stats(&self) -> SourceResult<Vec<HourlyAverage>> {
        self.get_json("/stats").await
    }

    async fn fetch_history(&self, date: NaiveDate) -> SourceResult<HistoryPayload> {
        let raw = self
            .get("/stats/history", &[("date", format_iso_date(date))])
            .await?;

        // An `{error}` body is the backend's answer whatever the status code
        let parsed = serde_json::from_slice::<HistoryPayload>(&raw.body);
        match parsed {
            Ok(rejected @ HistoryPayload::Rejected { .. }) => Ok(rejected),
            _ if !raw.status.is_success() => Err(raw.into_status_error()),
            Ok(series) => Ok(series),
            Err(e) => Err(e.into()),
        }
    }
}
