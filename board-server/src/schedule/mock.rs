//! Mock schedule source for running without a schedule endpoint.
//!
//! Loads schedule documents from JSON files and serves them as if they were
//! live responses.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;

use super::error::FetchError;
use super::types::{Schedule, StationId};
use super::ScheduleSource;

/// Errors loading mock schedule files.
#[derive(Debug, thiserror::Error)]
pub enum MockLoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("no mock schedule files found in {0:?}")]
    Empty(PathBuf),
}

/// Mock schedule source that serves data from JSON files.
///
/// Files are read once, at construction. Every fetch returns a fresh copy
/// stamped with the current time, so the board behaves as if the server
/// regenerated the schedule.
#[derive(Debug, Clone)]
pub struct MockScheduleSource {
    /// Pre-loaded schedules, keyed by station identifier.
    schedules: Arc<HashMap<String, Schedule>>,
}

impl MockScheduleSource {
    /// Create a new mock source by loading JSON files from a directory.
    ///
    /// Expects files named `{station}.json`, whose `station` field matches
    /// the file name.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, MockLoadError> {
        let schedules = load_dir(data_dir.as_ref())?;
        Ok(Self {
            schedules: Arc::new(schedules),
        })
    }

    /// Serve the stored schedule for a station.
    pub async fn get_schedule(&self, station: &StationId) -> Result<Schedule, FetchError> {
        let mut schedule = self
            .schedules
            .get(station.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                message: format!("no mock schedule for station {station}"),
            })?;

        schedule.timestamp = Utc::now();
        Ok(schedule)
    }

    /// List available stations in the mock data.
    pub fn available_stations(&self) -> Vec<String> {
        let mut stations: Vec<String> = self.schedules.keys().cloned().collect();
        stations.sort();
        stations
    }
}

impl ScheduleSource for MockScheduleSource {
    fn fetch(
        &self,
        station: &StationId,
    ) -> impl Future<Output = Result<Schedule, FetchError>> + Send {
        self.get_schedule(station)
    }
}

fn load_dir(data_dir: &Path) -> Result<HashMap<String, Schedule>, MockLoadError> {
    let dir_err = |source| MockLoadError::Io {
        path: data_dir.to_path_buf(),
        source,
    };

    let mut schedules = HashMap::new();

    for entry in std::fs::read_dir(data_dir).map_err(dir_err)? {
        let path = entry.map_err(dir_err)?.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| MockLoadError::Parse {
                path: path.clone(),
                message: "file name is not valid UTF-8".to_string(),
            })?
            .to_string();

        let json = std::fs::read_to_string(&path).map_err(|source| MockLoadError::Io {
            path: path.clone(),
            source,
        })?;
        let schedule: Schedule = serde_json::from_str(&json).map_err(|e| MockLoadError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        if schedule.station != stem {
            return Err(MockLoadError::Parse {
                path,
                message: format!("station {:?} does not match file name", schedule.station),
            });
        }

        schedules.insert(stem, schedule);
    }

    if schedules.is_empty() {
        return Err(MockLoadError::Empty(data_dir.to_path_buf()));
    }

    Ok(schedules)
}
