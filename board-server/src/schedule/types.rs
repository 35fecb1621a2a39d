//! Schedule document types.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Error returned when a station identifier is empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("station identifier must not be empty")]
pub struct EmptyStationId;

/// Identifier of the station a board is showing.
///
/// The identifier is opaque to the board: any non-blank string is accepted
/// and passed to the schedule endpoint unchanged (apart from surrounding
/// whitespace, which is trimmed).
///
/// # Examples
///
/// ```
/// use board_server::schedule::StationId;
///
/// let abc = StationId::parse("ABC").unwrap();
/// assert_eq!(abc.as_str(), "ABC");
///
/// // Blank identifiers mean "no station selected"
/// assert!(StationId::parse("  ").is_err());
/// assert_eq!(StationId::from_param(None), None);
/// assert_eq!(StationId::from_param(Some("")), None);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    /// Parse a station identifier, rejecting blank input.
    pub fn parse(s: &str) -> Result<Self, EmptyStationId> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EmptyStationId);
        }
        Ok(StationId(trimmed.to_string()))
    }

    /// Interpret an optional route parameter.
    ///
    /// Absent and blank parameters both yield `None`, which disables fetching.
    pub fn from_param(param: Option<&str>) -> Option<Self> {
        param.and_then(|p| Self::parse(p).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One station's upcoming departures, as generated by the schedule endpoint.
///
/// A schedule is never patched: every successful fetch yields a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// When the server generated this schedule.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Station identifier; must match the identifier that was requested.
    pub station: String,

    /// Human-readable station name.
    pub station_name: String,

    /// Departures, soonest first. Order is significant.
    pub trains: Vec<Train>,
}

/// A single departure row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Train {
    /// Either a clock time ("10:45") or minutes remaining ("5 min").
    pub time: String,

    pub destination: String,

    /// Line code, e.g. "C1". Also selects the badge style.
    pub name: String,

    /// Platform or routing annotation. Often empty.
    #[serde(default)]
    pub via: String,
}

/// Accept RFC 3339 timestamps, and naive ones (interpreted as UTC).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;

    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
}
