//! Application state for the web layer.

use std::sync::Arc;

use crate::board::BoardRegistry;
use crate::schedule::Backend;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Boards on screen, one per layout
    pub boards: Arc<BoardRegistry<Backend>>,

    /// Seconds between automatic page reloads
    pub page_refresh_secs: u64,

    /// Stations known up front, linked from the index page
    pub stations: Arc<Vec<String>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(boards: Arc<BoardRegistry<Backend>>, page_refresh_secs: u64) -> Self {
        Self {
            boards,
            page_refresh_secs,
            stations: Arc::new(Vec::new()),
        }
    }

    /// Link these stations from the index page.
    pub fn with_stations(mut self, stations: Vec<String>) -> Self {
        self.stations = Arc::new(stations);
        self
    }
}
