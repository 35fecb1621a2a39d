//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

/// Query string of the list board.
#[derive(Debug, Default, Deserialize)]
pub struct StationQuery {
    /// Station identifier. Absent or blank shows the "no station" page.
    pub station: Option<String>,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
