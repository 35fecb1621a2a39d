//! Web layer for the departure boards.
//!
//! Serves each board as an auto-refreshing HTML page, or as JSON to
//! clients that do not ask for HTML.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
