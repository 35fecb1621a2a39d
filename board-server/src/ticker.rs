//! Locally ticking state: the wall clock and the marquee scroll.
//!
//! Both run on their own timers, independent of schedule fetches. A slow
//! backend never delays a tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Local;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Clock tick period.
pub const CLOCK_PERIOD: Duration = Duration::from_secs(1);

/// One full scroll of the marquee ticker.
pub const MARQUEE_CYCLE: Duration = Duration::from_secs(25);

/// How often the marquee phase is recomputed.
pub const MARQUEE_FRAME: Duration = Duration::from_millis(100);

const CLOCK_FORMAT: &str = "%H:%M:%S";

/// A repeating task that is aborted when stopped or dropped.
struct Ticker {
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    fn idle() -> Self {
        Self { task: None }
    }

    fn start<F>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        if self.is_running() {
            return;
        }

        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                on_tick();
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn local_time() -> String {
    Local::now().format(CLOCK_FORMAT).to_string()
}

/// Local wall clock, updated once per second.
pub struct Clock {
    ticker: Ticker,
    current: watch::Sender<String>,
    ticks: Arc<AtomicU64>,
}

impl Clock {
    pub fn new() -> Self {
        let (current, _) = watch::channel(local_time());
        Self {
            ticker: Ticker::idle(),
            current,
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn start(&mut self) {
        let current = self.current.clone();
        let ticks = self.ticks.clone();
        self.ticker.start(CLOCK_PERIOD, move || {
            ticks.fetch_add(1, Ordering::Relaxed);
            current.send_replace(local_time());
        });
    }

    pub fn stop(&mut self) {
        self.ticker.stop();
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_running()
    }

    /// The time as of the latest tick, `HH:MM:SS`.
    pub fn current(&self) -> String {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.current.subscribe()
    }

    /// Ticks since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Position within the marquee scroll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarqueePhase {
    /// Milliseconds into the current cycle.
    pub elapsed_ms: u64,
    /// Horizontal translation, from `0` down to `-50` percent.
    pub offset_percent: f64,
}

impl MarqueePhase {
    pub fn start() -> Self {
        Self {
            elapsed_ms: 0,
            offset_percent: 0.0,
        }
    }

    /// Phase after `elapsed` of scrolling with the given cycle length.
    pub fn at(elapsed: Duration, cycle: Duration) -> Self {
        let cycle_ms = cycle.as_millis().max(1);
        let elapsed_ms = (elapsed.as_millis() % cycle_ms) as u64;
        Self {
            elapsed_ms,
            offset_percent: -50.0 * elapsed_ms as f64 / cycle_ms as f64,
        }
    }
}

/// The scrolling ticker's phase, looping every [`MARQUEE_CYCLE`].
///
/// Rendering only snapshots the phase; the browser animates between
/// refreshes, started at the current phase.
pub struct Marquee {
    ticker: Ticker,
    cycle: Duration,
    phase: watch::Sender<MarqueePhase>,
}

impl Marquee {
    pub fn new() -> Self {
        Self::with_cycle(MARQUEE_CYCLE)
    }

    pub fn with_cycle(cycle: Duration) -> Self {
        let (phase, _) = watch::channel(MarqueePhase::start());
        Self {
            ticker: Ticker::idle(),
            cycle,
            phase,
        }
    }

    /// Start scrolling from the beginning of a cycle.
    pub fn start(&mut self) {
        if self.ticker.is_running() {
            return;
        }

        let started = Instant::now();
        let cycle = self.cycle;
        let phase = self.phase.clone();
        phase.send_replace(MarqueePhase::start());
        self.ticker.start(MARQUEE_FRAME, move || {
            phase.send_replace(MarqueePhase::at(started.elapsed(), cycle));
        });
    }

    pub fn stop(&mut self) {
        self.ticker.stop();
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn cycle(&self) -> Duration {
        self.cycle
    }

    pub fn phase(&self) -> MarqueePhase {
        *self.phase.borrow()
    }
}

impl Default for Marquee {
    fn default() -> Self {
        Self::new()
    }
}
