//! The boards currently on screen, one per layout and station.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

use crate::schedule::{ScheduleSource, StationId};

use super::active::ActiveBoard;
use super::view::BoardView;
use super::{BoardSettings, BoardVariant};

/// Default time a board may go unviewed before it is taken off screen.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

type BoardKey = (BoardVariant, StationId);

/// Holds one board per layout and station, like a wall of kiosk screens.
///
/// Showing a board activates it on first use. Viewers of different stations
/// never share a board, so each station keeps its own polling cadence.
/// Boards nobody has looked at for the idle timeout are deactivated and
/// dropped by [`reap_idle`](Self::reap_idle).
pub struct BoardRegistry<S: ScheduleSource> {
    source: Arc<S>,
    settings: BoardSettings,
    idle_timeout: Duration,
    boards: Mutex<HashMap<BoardKey, ActiveBoard<S>>>,
}

impl<S: ScheduleSource> BoardRegistry<S> {
    pub fn new(source: Arc<S>, settings: BoardSettings) -> Self {
        Self {
            source,
            settings,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            boards: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Show `variant` for `station` and return what it displays right now.
    ///
    /// Without a station nothing is fetched and no board is created.
    pub async fn show(&self, variant: BoardVariant, station: Option<StationId>) -> BoardView {
        let Some(station) = station else {
            return BoardView::not_ready(variant);
        };

        let mut boards = self.boards.lock().await;
        let board = boards
            .entry((variant, station.clone()))
            .or_insert_with(|| ActiveBoard::new(variant, self.source.clone(), &self.settings));

        if board.is_active() {
            board.touch();
        } else {
            board.activate(Some(station));
        }
        board.view()
    }

    /// Drop boards idle for at least the idle timeout, which stops their
    /// polling and timers. Returns how many were dropped.
    pub async fn reap_idle(&self) -> usize {
        let mut boards = self.boards.lock().await;
        let before = boards.len();
        boards.retain(|(variant, station), board| {
            let idle = board.idle_for() >= self.idle_timeout;
            if idle {
                info!(board = %variant, %station, "dropping idle board");
            }
            !idle
        });
        before - boards.len()
    }

    /// Boards currently on screen, by layout name then station.
    pub async fn active(&self) -> Vec<(BoardVariant, String)> {
        let boards = self.boards.lock().await;
        let mut active: Vec<_> = boards
            .iter()
            .filter(|(_, board)| board.is_active())
            .map(|((variant, station), _)| (*variant, station.to_string()))
            .collect();
        active.sort_by(|a, b| (a.0.name(), &a.1).cmp(&(b.0.name(), &b.1)));
        active
    }

    /// Deactivate every board.
    pub async fn shutdown(&self) {
        let mut boards = self.boards.lock().await;
        for board in boards.values_mut() {
            board.deactivate();
        }
    }

    /// Periodically reap idle boards until the handle is aborted.
    pub fn spawn_reaper(self: &Arc<Self>) -> JoinHandle<()> {
        let registry = self.clone();
        let every = (registry.idle_timeout / 4).max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                let reaped = registry.reap_idle().await;
                if reaped > 0 {
                    info!(reaped, "dropped idle boards");
                }
            }
        })
    }
}
