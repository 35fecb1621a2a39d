//! A board on screen: its polling cache and, for the marquee layout, its
//! clock and ticker.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, TimeZone};
use futures::future::BoxFuture;
use tokio::time::Instant;
use tracing::info;

use crate::poll::{PollingCache, QuerySnapshot};
use crate::schedule::{FetchError, Schedule, ScheduleSource, StationId};
use crate::ticker::{Clock, Marquee};
use crate::transform::{TrainNumbers, repeat_banner};

use super::display::DisplayState;
use super::view::{BoardBody, BoardContent, BoardView, list_view, marquee_view, platform_view};
use super::{BoardSettings, BoardVariant};

/// Local timers of the marquee layout.
struct Timers {
    clock: Clock,
    marquee: Marquee,
}

impl Timers {
    fn start(&mut self) {
        self.clock.start();
        self.marquee.start();
    }

    fn stop(&mut self) {
        self.clock.stop();
        self.marquee.stop();
    }
}

/// One board and everything it owns.
///
/// Starts inactive. [`activate`](Self::activate) starts polling and timers,
/// [`deactivate`](Self::deactivate) stops all of them.
pub struct ActiveBoard<S: ScheduleSource> {
    variant: BoardVariant,
    cache: PollingCache<S>,
    timers: Option<Timers>,
    numbers: TrainNumbers,
    ticker_text: String,
    active: bool,
    last_viewed: Instant,
}

impl<S: ScheduleSource> ActiveBoard<S> {
    pub fn new(variant: BoardVariant, source: Arc<S>, settings: &BoardSettings) -> Self {
        let timers = variant.has_local_timers().then(|| Timers {
            clock: Clock::new(),
            marquee: Marquee::new(),
        });

        Self {
            variant,
            cache: PollingCache::new(source, settings.poll.clone()),
            timers,
            numbers: TrainNumbers::new(),
            ticker_text: repeat_banner(&settings.ticker_text, settings.ticker_repeats),
            active: false,
            last_viewed: Instant::now(),
        }
    }

    pub fn variant(&self) -> BoardVariant {
        self.variant
    }

    /// Put the board on screen showing `station`.
    pub fn activate(&mut self, station: Option<StationId>) {
        if !self.active {
            info!(board = %self.variant, station = ?station, "board activated");
            self.active = true;
            if let Some(timers) = &mut self.timers {
                timers.start();
            }
        }
        self.touch();
        self.cache.set_station(station);
    }

    /// Take the board off screen. Polling and timers stop.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        info!(board = %self.variant, "board deactivated");
        self.active = false;
        self.cache.shutdown();
        if let Some(timers) = &mut self.timers {
            timers.stop();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn station(&self) -> Option<StationId> {
        self.cache.station()
    }

    /// Record that the board was looked at.
    pub fn touch(&mut self) {
        self.last_viewed = Instant::now();
    }

    /// Time since the board was last looked at.
    pub fn idle_for(&self) -> Duration {
        self.last_viewed.elapsed()
    }

    pub fn snapshot(&self) -> QuerySnapshot {
        self.cache.snapshot()
    }

    pub fn display_state(&self) -> DisplayState<Arc<Schedule>> {
        DisplayState::from_snapshot(&self.cache.snapshot())
    }

    /// Refresh now, joining any fetch already running.
    pub fn refetch(&self) -> BoxFuture<'static, ()> {
        self.cache.refetch()
    }

    pub fn fetch_count(&self) -> u64 {
        self.cache.fetch_count()
    }

    pub fn is_polling(&self) -> bool {
        self.cache.is_polling()
    }

    /// Whether the clock and ticker are running.
    pub fn timers_running(&self) -> bool {
        self.timers
            .as_ref()
            .is_some_and(|t| t.clock.is_running() || t.marquee.is_running())
    }

    /// The board as it should be drawn now, in local time.
    pub fn view(&mut self) -> BoardView {
        self.view_in(&Local)
    }

    /// The board as it should be drawn now, timestamps in `tz`.
    pub fn view_in<Tz>(&mut self, tz: &Tz) -> BoardView
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let snapshot = self.cache.snapshot();
        let station = snapshot.station.as_ref().map(|s| s.to_string());

        let body = match DisplayState::from_snapshot(&snapshot) {
            DisplayState::NotReady => BoardBody::NotReady,
            DisplayState::Loading => BoardBody::Loading,
            DisplayState::Error(error) => BoardBody::error(&error),
            DisplayState::Ready(schedule) => {
                BoardBody::Ready(self.content(&schedule, snapshot.error.as_ref(), tz))
            }
        };

        BoardView {
            variant: self.variant,
            station,
            body,
        }
    }

    fn content<Tz>(
        &mut self,
        schedule: &Arc<Schedule>,
        stale: Option<&FetchError>,
        tz: &Tz,
    ) -> BoardContent
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        match self.variant {
            BoardVariant::List => BoardContent::List(list_view(schedule, stale, tz)),
            BoardVariant::Platform => BoardContent::Platform(platform_view(schedule, tz)),
            BoardVariant::Marquee => {
                let (clock, elapsed_ms, cycle_secs) = match &self.timers {
                    Some(timers) => (
                        timers.clock.current(),
                        timers.marquee.phase().elapsed_ms,
                        timers.marquee.cycle().as_secs(),
                    ),
                    None => (String::new(), 0, 0),
                };
                let numbers = self.numbers.numbers_for(schedule);
                BoardContent::Marquee(marquee_view(
                    schedule,
                    numbers,
                    clock,
                    self.ticker_text.clone(),
                    elapsed_ms,
                    cycle_secs,
                ))
            }
        }
    }
}

impl<S: ScheduleSource> Drop for ActiveBoard<S> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{FakeSource, central};
    use crate::schedule::FetchErrorKind;
    use chrono::Utc;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    fn board(variant: BoardVariant, source: &Arc<FakeSource>) -> ActiveBoard<FakeSource> {
        ActiveBoard::new(variant, source.clone(), &BoardSettings::default())
    }

    fn abc() -> Option<StationId> {
        Some(StationId::parse("ABC").unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn marquee_scenario() {
        let source = Arc::new(FakeSource::new());
        source.respond("ABC", Duration::ZERO, Ok(central()));
        let mut board = board(BoardVariant::Marquee, &source);

        board.activate(abc());
        assert!(matches!(board.view_in(&Utc).body, BoardBody::Loading));
        settle().await;

        let view = board.view_in(&Utc);
        assert_eq!(view.station.as_deref(), Some("ABC"));
        let BoardBody::Ready(BoardContent::Marquee(marquee)) = view.body else {
            panic!("expected marquee content");
        };
        let row = &marquee.rows[0];
        assert_eq!(row.name, "C1");
        assert_eq!(row.time.value, "5");
        assert_eq!(row.time.unit.as_deref(), Some(" min"));
        assert_eq!(row.destination, "North");
        assert_eq!(row.via, "2");
        assert!((18000..=24999).contains(&row.train_number));
        assert_eq!(marquee.ticker_cycle_secs, 25);
        assert_eq!(marquee.clock.len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn train_numbers_stable_between_fetches() {
        let source = Arc::new(FakeSource::new());
        source.respond_ok("ABC", 4);
        let mut board = board(BoardVariant::Marquee, &source);

        board.activate(abc());
        settle().await;

        let numbers = |view: BoardView| match view.body {
            BoardBody::Ready(BoardContent::Marquee(m)) => {
                m.rows.iter().map(|r| r.train_number).collect::<Vec<_>>()
            }
            _ => panic!("expected marquee content"),
        };

        let first = numbers(board.view_in(&Utc));
        let second = numbers(board.view_in(&Utc));
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn platform_board_truncates() {
        let source = Arc::new(FakeSource::new());
        source.respond_ok("ABC", 13);
        let mut board = board(BoardVariant::Platform, &source);

        board.activate(abc());
        settle().await;

        let BoardBody::Ready(BoardContent::Platform(platform)) = board.view_in(&Utc).body else {
            panic!("expected platform content");
        };
        assert_eq!(platform.rows.len(), 12);
        assert!(!board.timers_running());
    }

    #[tokio::test(start_paused = true)]
    async fn server_error_shows_error_placeholder() {
        let source = Arc::new(FakeSource::new());
        source.respond_status("ABC", 500);
        let mut board = board(BoardVariant::List, &source);

        board.activate(abc());
        settle().await;

        match board.view_in(&Utc).body {
            BoardBody::Error { kind, message } => {
                assert_eq!(kind, FetchErrorKind::NetworkFailure);
                assert!(message.contains("500"));
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn background_failure_keeps_rows_and_flags_them() {
        let source = Arc::new(FakeSource::new());
        source.respond_ok("ABC", 2);
        source.respond_status("ABC", 503);
        let mut board = board(BoardVariant::List, &source);

        board.activate(abc());
        settle().await;
        tokio::time::sleep(Duration::from_secs(30)).await;

        let BoardBody::Ready(BoardContent::List(list)) = board.view_in(&Utc).body else {
            panic!("expected list content");
        };
        assert_eq!(list.rows.len(), 2);
        assert!(list.stale.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn no_station_is_not_ready() {
        let source = Arc::new(FakeSource::new());
        let mut board = board(BoardVariant::List, &source);

        board.activate(None);
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert!(matches!(board.view_in(&Utc).body, BoardBody::NotReady));
        assert_eq!(source.total_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn deactivation_stops_every_timer() {
        let source = Arc::new(FakeSource::new());
        source.respond_ok("ABC", 1);
        let mut board = board(BoardVariant::Marquee, &source);

        board.activate(abc());
        settle().await;
        assert!(board.timers_running());
        assert!(board.is_polling());

        board.deactivate();
        settle().await;
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert!(!board.is_active());
        assert!(!board.timers_running());
        assert!(!board.is_polling());
        assert_eq!(source.calls_for("ABC"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_time_resets_on_touch() {
        let source = Arc::new(FakeSource::new());
        let mut board = board(BoardVariant::List, &source);

        board.activate(None);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(board.idle_for() >= Duration::from_secs(10));

        board.touch();
        assert!(board.idle_for() < Duration::from_secs(1));
    }
}
