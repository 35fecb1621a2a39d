//! What a board shows, given the polling cache's state.

use std::sync::Arc;

use crate::poll::QuerySnapshot;
use crate::schedule::{FetchError, Schedule};

/// The four things a board can show.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState<T> {
    /// No station selected.
    NotReady,
    /// Waiting for the first response for the selected station.
    Loading,
    /// The selected station has never loaded and the last fetch failed.
    Error(FetchError),
    Ready(T),
}

impl DisplayState<Arc<Schedule>> {
    /// Reduce a snapshot to a display state.
    ///
    /// Loaded data always wins over an error: a failed background refresh
    /// never blanks rows already on screen.
    pub fn from_snapshot(snapshot: &QuerySnapshot) -> Self {
        if snapshot.station.is_none() {
            return DisplayState::NotReady;
        }
        if let Some(data) = &snapshot.data {
            return DisplayState::Ready(data.clone());
        }
        match &snapshot.error {
            Some(error) => DisplayState::Error(error.clone()),
            None => DisplayState::Loading,
        }
    }
}

impl<T> DisplayState<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DisplayState<U> {
        match self {
            DisplayState::NotReady => DisplayState::NotReady,
            DisplayState::Loading => DisplayState::Loading,
            DisplayState::Error(error) => DisplayState::Error(error),
            DisplayState::Ready(data) => DisplayState::Ready(f(data)),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, DisplayState::Ready(_))
    }
}
