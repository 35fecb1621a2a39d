//! Departure boards.
//!
//! Three layouts share one data contract: a polled [`Schedule`] reduced to a
//! [`DisplayState`], then shaped per layout into a serializable view.
//!
//! [`Schedule`]: crate::schedule::Schedule

mod active;
mod display;
mod registry;
mod view;

use std::fmt;

use serde::Serialize;

use crate::poll::PollConfig;

pub use active::ActiveBoard;
pub use display::DisplayState;
pub use registry::BoardRegistry;
pub use view::{
    BoardBody, BoardContent, BoardView, ListBoardView, ListRowView, MarqueeBoardView,
    MarqueeRowView, PlatformBoardView, PlatformRowView, TimeView, list_view, marquee_view,
    platform_view,
};

/// Stations named on the marquee ticker.
pub const DEFAULT_TICKER_TEXT: &str =
    "Atocha Cercanías · Méndez Álvaro · Delicias · Pirámides · P.Pío ·";

/// Board layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardVariant {
    /// Every train, plain list.
    List,
    /// Station platform display, first rows only.
    Platform,
    /// Commuter display with live clock and scrolling ticker.
    Marquee,
}

impl BoardVariant {
    pub const ALL: [BoardVariant; 3] = [
        BoardVariant::List,
        BoardVariant::Platform,
        BoardVariant::Marquee,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BoardVariant::List => "list",
            BoardVariant::Platform => "platform",
            BoardVariant::Marquee => "marquee",
        }
    }

    /// Whether the layout shows a live clock and scrolling ticker.
    pub fn has_local_timers(&self) -> bool {
        matches!(self, BoardVariant::Marquee)
    }
}

impl fmt::Display for BoardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Settings shared by every board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSettings {
    pub poll: PollConfig,

    /// Text scrolled along the bottom of the marquee board.
    pub ticker_text: String,

    /// Copies of the ticker text laid end to end.
    pub ticker_repeats: usize,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            poll: PollConfig::default(),
            ticker_text: DEFAULT_TICKER_TEXT.to_string(),
            ticker_repeats: 3,
        }
    }
}

impl BoardSettings {
    pub fn new(poll: PollConfig) -> Self {
        Self {
            poll,
            ..Self::default()
        }
    }

    pub fn with_ticker_text(mut self, text: impl Into<String>) -> Self {
        self.ticker_text = text.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_names() {
        let names: Vec<_> = BoardVariant::ALL.iter().map(|v| v.to_string()).collect();
        assert_eq!(names, ["list", "platform", "marquee"]);
        assert_eq!(
            serde_json::to_string(&BoardVariant::Platform).unwrap(),
            "\"platform\""
        );
    }

    #[test]
    fn only_marquee_ticks_locally() {
        assert!(BoardVariant::Marquee.has_local_timers());
        assert!(!BoardVariant::List.has_local_timers());
        assert!(!BoardVariant::Platform.has_local_timers());
    }

    #[test]
    fn settings_builder() {
        let settings = BoardSettings::default().with_ticker_text("Sol ·");
        assert_eq!(settings.ticker_text, "Sol ·");
        assert_eq!(settings.ticker_repeats, 3);
        assert_eq!(settings.poll, PollConfig::default());
    }
}
