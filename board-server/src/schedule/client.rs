//! Schedule endpoint HTTP client.
//!
//! Issues `GET {base_url}/schedule/{station}` and decodes the JSON body.
//! One request per call: no retries, no caching. Freshness is the polling
//! cache's job.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use super::error::FetchError;
use super::types::{Schedule, StationId};
use super::ScheduleSource;

/// Default base URL of the schedule endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How much of an unexpected body to keep in error messages.
const BODY_SNIPPET_CHARS: usize = 500;

/// Configuration for the schedule client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Base URL of the endpoint, without the `/schedule` path.
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ScheduleConfig {
    /// Create a config pointing at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// HTTP client for the schedule endpoint.
#[derive(Debug, Clone)]
pub struct ScheduleClient {
    http: reqwest::Client,
    base_url: String,
}

impl ScheduleClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ScheduleConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the schedule document for a station.
    ///
    /// The identifier is percent-encoded so it always forms a single path
    /// segment.
    pub fn schedule_url(&self, station: &StationId) -> String {
        format!(
            "{}/schedule/{}",
            self.base_url,
            urlencoding::encode(station.as_str())
        )
    }

    /// Fetch the current schedule for a station.
    pub async fn get_schedule(&self, station: &StationId) -> Result<Schedule, FetchError> {
        let url = self.schedule_url(station);
        debug!(%station, %url, "requesting schedule");

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                body.chars().take(BODY_SNIPPET_CHARS).collect()
            };
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        decode_schedule(station, &body)
    }
}

impl ScheduleSource for ScheduleClient {
    fn fetch(
        &self,
        station: &StationId,
    ) -> impl Future<Output = Result<Schedule, FetchError>> + Send {
        self.get_schedule(station)
    }
}

/// Decode a schedule body and check it belongs to the requested station.
pub fn decode_schedule(station: &StationId, body: &str) -> Result<Schedule, FetchError> {
    let schedule: Schedule = serde_json::from_str(body).map_err(|e| FetchError::Decode {
        message: e.to_string(),
        body: Some(body.chars().take(BODY_SNIPPET_CHARS).collect()),
    })?;

    if schedule.station != station.as_str() {
        return Err(FetchError::StationMismatch {
            requested: station.to_string(),
            received: schedule.station,
        });
    }

    Ok(schedule)
}
