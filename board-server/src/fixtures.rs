//! Shared test fixtures: sample schedules and a scriptable schedule source.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use crate::schedule::{FetchError, Schedule, ScheduleSource, StationId, Train};

/// A schedule for `station` with `trains` rows, in departure order.
pub fn schedule(station: &str, trains: usize) -> Schedule {
    Schedule {
        timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
        station: station.to_string(),
        station_name: format!("{station} Central"),
        trains: (0..trains)
            .map(|i| Train {
                time: format!("{} min", i * 4 + 1),
                destination: format!("Destination {i}"),
                name: format!("C{}", i % 10 + 1),
                via: format!("{}", i % 4 + 1),
            })
            .collect(),
    }
}

/// The single-row `ABC` schedule used in the board scenarios.
pub fn central() -> Schedule {
    Schedule {
        timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
        station: "ABC".to_string(),
        station_name: "Central".to_string(),
        trains: vec![Train {
            time: "5 min".to_string(),
            destination: "North".to_string(),
            name: "C1".to_string(),
            via: "2".to_string(),
        }],
    }
}

#[derive(Clone)]
struct Scripted {
    delay: Duration,
    result: Result<Schedule, FetchError>,
}

#[derive(Default)]
struct FakeState {
    scripts: HashMap<String, VecDeque<Scripted>>,
    calls: Vec<String>,
}

/// Schedule source that replays scripted responses per station.
///
/// Responses are consumed in order; the last one repeats forever. Stations
/// without a script answer 404.
#[derive(Default)]
pub struct FakeSource {
    state: Mutex<FakeState>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, station: &str, delay: Duration, result: Result<Schedule, FetchError>) {
        let mut state = self.state.lock().unwrap();
        state
            .scripts
            .entry(station.to_string())
            .or_default()
            .push_back(Scripted { delay, result });
    }

    pub fn respond_ok(&self, station: &str, trains: usize) {
        self.respond(station, Duration::ZERO, Ok(schedule(station, trains)));
    }

    pub fn respond_ok_after(&self, station: &str, trains: usize, delay: Duration) {
        self.respond(station, delay, Ok(schedule(station, trains)));
    }

    pub fn respond_status(&self, station: &str, status: u16) {
        self.respond(
            station,
            Duration::ZERO,
            Err(FetchError::Status {
                status,
                message: "Internal Server Error".to_string(),
            }),
        );
    }

    pub fn calls_for(&self, station: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.calls.iter().filter(|s| *s == station).count()
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    fn next(&self, station: &StationId) -> Scripted {
        let mut state = self.state.lock().unwrap();
        state.calls.push(station.to_string());

        let Some(script) = state.scripts.get_mut(station.as_str()) else {
            return Scripted {
                delay: Duration::ZERO,
                result: Err(FetchError::Status {
                    status: 404,
                    message: format!("unknown station {station}"),
                }),
            };
        };

        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap()
        }
    }
}

impl ScheduleSource for FakeSource {
    fn fetch(
        &self,
        station: &StationId,
    ) -> impl Future<Output = Result<Schedule, FetchError>> + Send {
        let scripted = self.next(station);
        async move {
            if !scripted.delay.is_zero() {
                tokio::time::sleep(scripted.delay).await;
            }
            scripted.result
        }
    }
}
