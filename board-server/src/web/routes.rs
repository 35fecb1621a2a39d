//! HTTP route handlers.

use std::path::Path;

use askama::Template;
use axum::{
    Json, Router,
    extract::{Path as UrlPath, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::board::{BoardVariant, BoardView};
use crate::schedule::StationId;

use super::dto::{ErrorResponse, StationQuery};
use super::state::AppState;
use super::templates::{IndexTemplate, render_board};

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/boards/list", get(list_board))
        .route("/boards/platform/:station", get(platform_board))
        .route("/boards/marquee/:station", get(marquee_board))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Index page linking to the boards.
async fn index_page(State(state): State<AppState>) -> Result<Response, AppError> {
    let template = IndexTemplate::new(&state.stations);
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })?;
    Ok(Html(html).into_response())
}

async fn not_found() -> AppError {
    AppError::NotFound {
        message: "No such page".to_string(),
    }
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// List board, station from the query string.
async fn list_board(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StationQuery>,
) -> Result<Response, AppError> {
    let station = StationId::from_param(query.station.as_deref());
    show_board(&state, &headers, BoardVariant::List, station).await
}

/// Platform board, station from the path.
async fn platform_board(
    State(state): State<AppState>,
    headers: HeaderMap,
    UrlPath(station): UrlPath<String>,
) -> Result<Response, AppError> {
    let station = StationId::from_param(Some(station.as_str()));
    show_board(&state, &headers, BoardVariant::Platform, station).await
}

/// Marquee board, station from the path.
async fn marquee_board(
    State(state): State<AppState>,
    headers: HeaderMap,
    UrlPath(station): UrlPath<String>,
) -> Result<Response, AppError> {
    let station = StationId::from_param(Some(station.as_str()));
    show_board(&state, &headers, BoardVariant::Marquee, station).await
}

async fn show_board(
    state: &AppState,
    headers: &HeaderMap,
    variant: BoardVariant,
    station: Option<StationId>,
) -> Result<Response, AppError> {
    let view = state.boards.show(variant, station).await;
    respond(&view, headers, state.page_refresh_secs)
}

/// HTML for browsers, the view itself as JSON otherwise.
fn respond(
    view: &BoardView,
    headers: &HeaderMap,
    refresh_secs: u64,
) -> Result<Response, AppError> {
    if accepts_html(headers) {
        let html = render_board(view, refresh_secs).map_err(|e| AppError::Internal {
            message: format!("Template error: {}", e),
        })?;
        Ok(Html(html).into_response())
    } else {
        Ok(Json(view).into_response())
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound { message: String },
    Internal { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => {
                error!(%message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
