//! Askama templates for the boards.

use askama::Template;

use crate::board::{
    BoardBody, BoardContent, BoardVariant, BoardView, ListBoardView, MarqueeBoardView,
    PlatformBoardView,
};

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Home page linking to the boards.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub stations: Vec<StationLink>,
}

impl IndexTemplate {
    pub fn new(stations: &[String]) -> Self {
        Self {
            stations: stations.iter().map(|s| StationLink::new(s)).collect(),
        }
    }
}

/// A station on the index page.
pub struct StationLink {
    pub name: String,
    /// Percent-encoded, safe as one path segment or query value.
    pub encoded: String,
}

impl StationLink {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            encoded: urlencoding::encode(name).into_owned(),
        }
    }
}

/// Board that has nothing to show yet.
#[derive(Template)]
#[template(path = "placeholder.html")]
pub struct PlaceholderTemplate {
    pub title: String,
    pub message: String,
    pub refresh_secs: u64,
}

/// Plain list of every train.
#[derive(Template)]
#[template(path = "list_board.html")]
pub struct ListBoardTemplate<'a> {
    pub board: &'a ListBoardView,
    pub refresh_secs: u64,
}

/// Station platform display.
#[derive(Template)]
#[template(path = "platform_board.html")]
pub struct PlatformBoardTemplate<'a> {
    pub board: &'a PlatformBoardView,
    pub refresh_secs: u64,
}

/// Commuter display with clock and scrolling ticker.
#[derive(Template)]
#[template(path = "marquee_board.html")]
pub struct MarqueeBoardTemplate<'a> {
    pub board: &'a MarqueeBoardView,
    pub refresh_secs: u64,
    /// CSS `animation-delay` that resumes the ticker where it was.
    pub ticker_delay: String,
}

fn title(variant: BoardVariant) -> String {
    match variant {
        BoardVariant::List => "Departures".to_string(),
        BoardVariant::Platform => "Salidas / Departures".to_string(),
        BoardVariant::Marquee => "Cercanías".to_string(),
    }
}

/// Negative delay so a freshly loaded page picks up the scroll mid-cycle.
fn ticker_delay(elapsed_ms: u64) -> String {
    format!("-{}.{:03}s", elapsed_ms / 1000, elapsed_ms % 1000)
}

fn placeholder(view: &BoardView, message: String, refresh_secs: u64) -> PlaceholderTemplate {
    PlaceholderTemplate {
        title: title(view.variant),
        message,
        refresh_secs,
    }
}

/// Render a board view as a full HTML page.
pub fn render_board(view: &BoardView, refresh_secs: u64) -> askama::Result<String> {
    match &view.body {
        BoardBody::NotReady => placeholder(
            view,
            "Please provide a station parameter".to_string(),
            refresh_secs,
        )
        .render(),
        BoardBody::Loading => placeholder(view, "Loading...".to_string(), refresh_secs).render(),
        BoardBody::Error { message, .. } => {
            placeholder(view, format!("Error: {message}"), refresh_secs).render()
        }
        BoardBody::Ready(content) => match content {
            BoardContent::List(board) if board.rows.is_empty() => {
                placeholder(view, "No data available".to_string(), refresh_secs).render()
            }
            BoardContent::List(board) => ListBoardTemplate {
                board,
                refresh_secs,
            }
            .render(),
            BoardContent::Platform(board) => PlatformBoardTemplate {
                board,
                refresh_secs,
            }
            .render(),
            BoardContent::Marquee(board) => MarqueeBoardTemplate {
                board,
                refresh_secs,
                ticker_delay: ticker_delay(board.ticker_elapsed_ms),
            }
            .render(),
        },
    }
}
