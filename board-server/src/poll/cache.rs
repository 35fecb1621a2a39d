//! Polling cache for schedules.
//!
//! Holds the latest good schedule for the selected station and refreshes it
//! on a fixed period. The period runs from the end of one fetch to the start
//! of the next. At most one fetch per station is outstanding: ticks and
//! manual refetches that arrive meanwhile await the fetch already running.
//!
//! Every fetch is tagged with the generation of the station selection it was
//! issued for. Switching station bumps the generation, so a response that
//! arrives for a superseded selection is dropped instead of being applied.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use moka::sync::Cache as MokaCache;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::schedule::{ScheduleSource, StationId};

use super::state::{Entry, QuerySnapshot};

/// An outstanding fetch that any number of callers can await.
type InFlight = Shared<BoxFuture<'static, ()>>;

/// Configuration for the polling cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Pause between the end of one fetch and the start of the next.
    pub interval: Duration,

    /// How long last-good data for a station that is no longer selected is
    /// kept, so switching back shows it immediately.
    pub retain_for: Duration,

    /// Maximum number of stations kept that way.
    pub retain_capacity: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            retain_for: Duration::from_secs(5 * 60),
            retain_capacity: 64,
        }
    }
}

/// The selected station and its entry.
struct Active {
    station: StationId,
    generation: u64,
    entry: Entry,
    in_flight: Option<InFlight>,
}

#[derive(Default)]
struct State {
    active: Option<Active>,
    generation: u64,
}

/// State shared between the cache handle, its polling task and fetches.
struct Core<S> {
    source: Arc<S>,
    state: Mutex<State>,
    retained: MokaCache<StationId, Entry>,
    snapshots: watch::Sender<QuerySnapshot>,
    fetches: AtomicU64,
}

impl<S: ScheduleSource> Core<S> {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, active: Option<&Active>) {
        let snapshot = match active {
            Some(active) => QuerySnapshot::from_entry(&active.station, &active.entry),
            None => QuerySnapshot::idle(),
        };
        self.snapshots.send_replace(snapshot);
    }

    /// Refresh the selection identified by `generation`.
    ///
    /// Returns `false` once that selection has been superseded.
    async fn refresh(self: Arc<Self>, generation: u64) -> bool {
        let fetch = {
            let mut state = self.lock();
            let Some(active) = state
                .active
                .as_mut()
                .filter(|active| active.generation == generation)
            else {
                return false;
            };

            match &active.in_flight {
                Some(fetch) => {
                    debug!(station = %active.station, "joining in-flight fetch");
                    fetch.clone()
                }
                None => {
                    active.entry.begin_fetch();
                    let fetch = self
                        .clone()
                        .fetch_and_apply(active.station.clone(), generation)
                        .boxed()
                        .shared();
                    active.in_flight = Some(fetch.clone());
                    self.publish(Some(&*active));
                    fetch
                }
            }
        };

        fetch.await;
        true
    }

    async fn fetch_and_apply(self: Arc<Self>, station: StationId, generation: u64) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let result = self.source.fetch(&station).await;
        let now = Utc::now();

        let mut state = self.lock();
        let Some(active) = state
            .active
            .as_mut()
            .filter(|active| active.generation == generation)
        else {
            debug!(%station, generation, "discarding response for superseded station");
            return;
        };

        active.in_flight = None;
        match result {
            Ok(schedule) => {
                debug!(%station, trains = schedule.trains.len(), "schedule refreshed");
                active.entry.succeed(schedule, now);
            }
            Err(error) => {
                warn!(%station, %error, "schedule refresh failed");
                active.entry.fail(error, now);
            }
        }
        self.publish(Some(&*active));
    }
}

/// Polls the schedule of one selected station at a time.
///
/// Must be used from within a tokio runtime. Dropping the cache stops
/// polling.
pub struct PollingCache<S: ScheduleSource> {
    core: Arc<Core<S>>,
    config: PollConfig,
    task: Option<JoinHandle<()>>,
}

impl<S: ScheduleSource> PollingCache<S> {
    /// Create a cache with no station selected.
    pub fn new(source: Arc<S>, config: PollConfig) -> Self {
        let retained = MokaCache::builder()
            .time_to_idle(config.retain_for)
            .max_capacity(config.retain_capacity)
            .build();

        let (snapshots, _) = watch::channel(QuerySnapshot::idle());

        Self {
            core: Arc::new(Core {
                source,
                state: Mutex::new(State::default()),
                retained,
                snapshots,
                fetches: AtomicU64::new(0),
            }),
            config,
            task: None,
        }
    }

    /// The station currently selected.
    pub fn station(&self) -> Option<StationId> {
        self.core
            .lock()
            .active
            .as_ref()
            .map(|active| active.station.clone())
    }

    /// Select the station to poll, or `None` to suspend polling.
    ///
    /// Selecting a different station stops the previous station's polling,
    /// drops interest in its outstanding fetch and fetches the new station
    /// immediately. Re-selecting the current station does nothing.
    pub fn set_station(&mut self, station: Option<StationId>) {
        if self.station() == station {
            return;
        }

        self.stop_polling();

        let generation = {
            let mut state = self.core.lock();

            if let Some(previous) = state.active.take()
                && previous.entry.data.is_some()
            {
                self.core.retained.insert(previous.station, previous.entry);
            }

            state.generation += 1;
            let generation = state.generation;

            state.active = station.map(|station| {
                let entry = self.core.retained.remove(&station).unwrap_or_default();
                Active {
                    station,
                    generation,
                    entry,
                    in_flight: None,
                }
            });
            self.core.publish(state.active.as_ref());

            if state.active.is_none() {
                debug!("no station selected, polling suspended");
                return;
            }
            generation
        };

        info!(station = ?self.station(), "polling schedule");
        self.task = Some(tokio::spawn(poll_loop(
            self.core.clone(),
            generation,
            self.config.interval,
        )));
    }

    /// Refresh the selected station now.
    ///
    /// Joins the outstanding fetch if there is one. Resolves immediately when
    /// no station is selected.
    pub fn refetch(&self) -> BoxFuture<'static, ()> {
        let core = self.core.clone();
        let generation = core.lock().active.as_ref().map(|active| active.generation);

        async move {
            if let Some(generation) = generation {
                core.refresh(generation).await;
            }
        }
        .boxed()
    }

    /// The latest state.
    pub fn snapshot(&self) -> QuerySnapshot {
        self.core.snapshots.borrow().clone()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<QuerySnapshot> {
        self.core.snapshots.subscribe()
    }

    /// Number of fetches issued so far.
    pub fn fetch_count(&self) -> u64 {
        self.core.fetches.load(Ordering::Relaxed)
    }

    /// Whether a polling task is running.
    pub fn is_polling(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop polling and deselect the station.
    pub fn shutdown(&mut self) {
        self.set_station(None);
    }

    fn stop_polling(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<S: ScheduleSource> Drop for PollingCache<S> {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

async fn poll_loop<S: ScheduleSource>(core: Arc<Core<S>>, generation: u64, interval: Duration) {
    while core.clone().refresh(generation).await {
        tokio::time::sleep(interval).await;
    }
}
