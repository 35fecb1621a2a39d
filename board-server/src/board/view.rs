//! Serializable board views, one shape per layout.

use std::fmt::Display;

use chrono::TimeZone;
use serde::Serialize;

use crate::schedule::{FetchError, FetchErrorKind, Schedule};
use crate::transform::{
    BadgeStyle, DestinationCase, TimeDisplay, display_destination, limit_rows,
};

use super::BoardVariant;

const UPDATED_AT_FORMAT: &str = "%-d/%-m/%Y, %H:%M:%S";
const CLOCK_FORMAT: &str = "%H:%M:%S";

/// A rendered board.
#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub variant: BoardVariant,
    pub station: Option<String>,
    pub body: BoardBody,
}

impl BoardView {
    /// A board asked to show no station.
    pub fn not_ready(variant: BoardVariant) -> Self {
        BoardView {
            variant,
            station: None,
            body: BoardBody::NotReady,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "content", rename_all = "snake_case")]
pub enum BoardBody {
    NotReady,
    Loading,
    Error {
        kind: FetchErrorKind,
        message: String,
    },
    Ready(BoardContent),
}

impl BoardBody {
    pub fn error(error: &FetchError) -> Self {
        BoardBody::Error {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardContent {
    List(ListBoardView),
    Platform(PlatformBoardView),
    Marquee(MarqueeBoardView),
}

#[derive(Debug, Clone, Serialize)]
pub struct ListBoardView {
    pub station_name: String,
    pub updated_at: String,
    pub rows: Vec<ListRowView>,
    /// Set when the latest background refresh failed and the rows are the
    /// last good ones.
    pub stale: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListRowView {
    pub name: String,
    pub badge_class: &'static str,
    pub time: String,
    pub destination: String,
    pub via: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformBoardView {
    pub station_name: String,
    pub updated_at: String,
    /// Time the schedule was generated, shown in the footer.
    pub footer_clock: String,
    pub rows: Vec<PlatformRowView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformRowView {
    pub platform: String,
    pub destination: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarqueeBoardView {
    /// Local wall clock.
    pub clock: String,
    pub rows: Vec<MarqueeRowView>,
    pub ticker_text: String,
    /// How far into its cycle the ticker is, in milliseconds.
    pub ticker_elapsed_ms: u64,
    pub ticker_cycle_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarqueeRowView {
    pub name: String,
    pub badge_class: &'static str,
    pub time: TimeView,
    pub destination: String,
    pub train_number: u32,
    pub via: String,
}

/// A departure time split into number and unit, or shown whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeView {
    pub value: String,
    pub unit: Option<String>,
}

impl From<TimeDisplay<'_>> for TimeView {
    fn from(time: TimeDisplay<'_>) -> Self {
        match time {
            TimeDisplay::Relative { value, unit } => TimeView {
                value: value.to_string(),
                unit: Some(unit.to_string()),
            },
            TimeDisplay::Absolute(time) => TimeView {
                value: time.to_string(),
                unit: None,
            },
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Every train, with an optional note that a refresh failed.
pub fn list_view<Tz>(schedule: &Schedule, stale: Option<&FetchError>, tz: &Tz) -> ListBoardView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let rows = schedule
        .trains
        .iter()
        .map(|train| ListRowView {
            name: train.name.clone(),
            badge_class: BadgeStyle::for_line(&train.name).css_class(),
            time: train.time.clone(),
            destination: train.destination.clone(),
            via: non_empty(&train.via),
        })
        .collect();

    ListBoardView {
        station_name: schedule.station_name.clone(),
        updated_at: schedule
            .timestamp
            .with_timezone(tz)
            .format(UPDATED_AT_FORMAT)
            .to_string(),
        rows,
        stale: stale.map(ToString::to_string),
    }
}

/// First rows, upper-cased destinations, platform from `via`.
pub fn platform_view<Tz>(schedule: &Schedule, tz: &Tz) -> PlatformBoardView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let generated = schedule.timestamp.with_timezone(tz);

    PlatformBoardView {
        station_name: schedule.station_name.clone(),
        updated_at: generated.format(UPDATED_AT_FORMAT).to_string(),
        footer_clock: generated.format(CLOCK_FORMAT).to_string(),
        rows: limit_rows(schedule)
            .iter()
            .map(|train| PlatformRowView {
                platform: train.via.clone(),
                destination: display_destination(train, DestinationCase::Upper).into_owned(),
                time: train.time.clone(),
            })
            .collect(),
    }
}

/// First rows with split times and train numbers.
///
/// `numbers` holds one train number per displayed row; missing entries
/// show as zero.
pub fn marquee_view(
    schedule: &Schedule,
    numbers: &[u32],
    clock: String,
    ticker_text: String,
    ticker_elapsed_ms: u64,
    ticker_cycle_secs: u64,
) -> MarqueeBoardView {
    let rows = limit_rows(schedule)
        .iter()
        .enumerate()
        .map(|(i, train)| MarqueeRowView {
            name: train.name.clone(),
            badge_class: BadgeStyle::for_line(&train.name).css_class(),
            time: TimeDisplay::parse(&train.time).into(),
            destination: train.destination.clone(),
            train_number: numbers.get(i).copied().unwrap_or_default(),
            via: train.via.clone(),
        })
        .collect();

    MarqueeBoardView {
        clock,
        rows,
        ticker_text,
        ticker_elapsed_ms,
        ticker_cycle_secs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{central, schedule};
    use chrono::Utc;

    #[test]
    fn list_shows_every_train() {
        let s = schedule("ABC", 20);
        let view = list_view(&s, None, &Utc);

        assert_eq!(view.rows.len(), 20);
        assert_eq!(view.station_name, "ABC Central");
        assert_eq!(view.updated_at, "1/1/2024, 10:00:00");
        assert!(view.stale.is_none());
    }

    #[test]
    fn list_hides_empty_via() {
        let mut s = central();
        s.trains[0].via.clear();
        let view = list_view(&s, None, &Utc);

        assert!(view.rows[0].via.is_none());
    }

    #[test]
    fn list_flags_stale_rows() {
        let error = FetchError::Transport {
            message: "connection refused".to_string(),
        };
        let view = list_view(&central(), Some(&error), &Utc);

        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.stale.as_deref(), Some("HTTP error: connection refused"));
    }

    #[test]
    fn platform_rows() {
        let view = platform_view(&central(), &Utc);
        let row = &view.rows[0];

        assert_eq!(row.platform, "2");
        assert_eq!(row.destination, "NORTH");
        assert_eq!(row.time, "5 min");
        assert_eq!(view.footer_clock, "10:00:00");
        assert_eq!(view.station_name, "Central");
    }

    #[test]
    fn platform_limits_rows() {
        let s = schedule("ABC", 13);
        let view = platform_view(&s, &Utc);

        assert_eq!(view.rows.len(), 12);
        assert_eq!(view.rows[11].destination, "DESTINATION 11");
    }

    #[test]
    fn marquee_row_scenario() {
        let view = marquee_view(&central(), &[18123], "10:00:00".into(), "X".into(), 0, 25);
        let row = &view.rows[0];

        assert_eq!(row.name, "C1");
        assert_eq!(row.badge_class, "badge-primary");
        assert_eq!(
            row.time,
            TimeView {
                value: "5".to_string(),
                unit: Some(" min".to_string())
            }
        );
        assert_eq!(row.destination, "North");
        assert_eq!(row.via, "2");
        assert_eq!(row.train_number, 18123);
    }

    #[test]
    fn marquee_absolute_time_and_c10_badge() {
        let mut s = central();
        s.trains[0].time = "10:45".to_string();
        s.trains[0].name = "C-10".to_string();
        let view = marquee_view(&s, &[], String::new(), String::new(), 0, 25);
        let row = &view.rows[0];

        assert_eq!(row.time.value, "10:45");
        assert!(row.time.unit.is_none());
        assert_eq!(row.badge_class, "badge-secondary");
        assert_eq!(row.train_number, 0);
    }

    #[test]
    fn body_serializes_with_state_tag() {
        let body = BoardBody::error(&FetchError::Status {
            status: 500,
            message: "boom".to_string(),
        });
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["state"], "error");
        assert_eq!(json["content"]["kind"], "network_failure");
        assert_eq!(
            json["content"]["message"],
            "schedule endpoint returned 500: boom"
        );

        let loading = serde_json::to_value(BoardBody::Loading).unwrap();
        assert_eq!(loading["state"], "loading");
    }
}
