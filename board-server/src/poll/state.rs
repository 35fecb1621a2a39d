//! Per-station query state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::schedule::{FetchError, Schedule, StationId};

/// Where a station's query is in its fetch cycle.
///
/// `Idle → Loading → {Success | Error}`, and back to `Loading` on every
/// refresh tick. Entering `Loading` never clears previously loaded data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Cached state for one station key.
#[derive(Debug, Clone, Default)]
pub(crate) struct Entry {
    pub status: QueryStatus,
    pub data: Option<Arc<Schedule>>,
    pub error: Option<FetchError>,
    pub data_updated_at: Option<DateTime<Utc>>,
    pub error_updated_at: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn begin_fetch(&mut self) {
        self.status = QueryStatus::Loading;
    }

    pub fn succeed(&mut self, schedule: Schedule, at: DateTime<Utc>) {
        self.status = QueryStatus::Success;
        self.data = Some(Arc::new(schedule));
        self.error = None;
        self.data_updated_at = Some(at);
    }

    /// Record a failure. Previously loaded data stays readable.
    pub fn fail(&mut self, error: FetchError, at: DateTime<Utc>) {
        self.status = QueryStatus::Error;
        self.error = Some(error);
        self.error_updated_at = Some(at);
    }
}

/// What consumers of the polling cache see.
#[derive(Debug, Clone, Default)]
pub struct QuerySnapshot {
    /// The station currently being polled, if any.
    pub station: Option<StationId>,

    pub status: QueryStatus,

    /// Latest successfully fetched schedule for `station`.
    pub data: Option<Arc<Schedule>>,

    /// Error from the most recent fetch, cleared by the next success.
    pub error: Option<FetchError>,

    /// True while a station is selected but neither data nor an error has
    /// arrived for it yet. Background refreshes never set this again.
    pub is_loading: bool,

    pub data_updated_at: Option<DateTime<Utc>>,
    pub error_updated_at: Option<DateTime<Utc>>,
}

impl QuerySnapshot {
    /// Snapshot for "no station selected".
    pub fn idle() -> Self {
        Self::default()
    }

    pub(crate) fn from_entry(station: &StationId, entry: &Entry) -> Self {
        Self {
            station: Some(station.clone()),
            status: entry.status,
            data: entry.data.clone(),
            error: entry.error.clone(),
            is_loading: entry.data.is_none() && entry.error.is_none(),
            data_updated_at: entry.data_updated_at,
            error_updated_at: entry.error_updated_at,
        }
    }

    /// Whether a fetch is currently outstanding.
    pub fn is_fetching(&self) -> bool {
        self.status == QueryStatus::Loading
    }
}
