//! Schedule fetch error types.

use serde::Serialize;

/// Errors from a single schedule fetch.
///
/// Messages are captured as strings so that errors can be cloned into cache
/// snapshots and shown on a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// No station identifier was supplied; nothing was requested.
    #[error("no station selected")]
    NotReady,

    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {message}")]
    Transport { message: String },

    /// The endpoint answered with a non-success status.
    #[error("schedule endpoint returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The body is not a schedule document.
    #[error("JSON parse error: {message}")]
    Decode {
        message: String,
        body: Option<String>,
    },

    /// The endpoint returned a schedule for a different station.
    #[error("requested station {requested} but received schedule for {received}")]
    StationMismatch { requested: String, received: String },
}

/// Coarse classification of [`FetchError`], used for display decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    NotReady,
    NetworkFailure,
    DecodeFailure,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::NotReady => FetchErrorKind::NotReady,
            FetchError::Transport { .. } | FetchError::Status { .. } => {
                FetchErrorKind::NetworkFailure
            }
            FetchError::Decode { .. } | FetchError::StationMismatch { .. } => {
                FetchErrorKind::DecodeFailure
            }
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport {
            message: err.to_string(),
        }
    }
}
