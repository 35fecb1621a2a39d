//! Display transforms from a [`Schedule`] to what a board shows.
//!
//! Everything here is pure except [`TrainNumbers`], which is decorative and
//! deliberately random.

use std::borrow::Cow;
use std::ops::RangeInclusive;
use std::sync::Arc;

use rand::Rng;
use serde::Serialize;

use crate::schedule::{Schedule, Train};

/// Rows shown on bounded boards.
pub const MAX_ROWS: usize = 12;

/// Range of the decorative train numbers.
pub const TRAIN_NUMBER_RANGE: RangeInclusive<u32> = 18000..=24999;

/// Separator placed between repetitions of the ticker text.
const BANNER_GAP: &str = "    ";

/// The first [`MAX_ROWS`] trains, in server order.
pub fn limit_rows(schedule: &Schedule) -> &[Train] {
    let rows = schedule.trains.len().min(MAX_ROWS);
    &schedule.trains[..rows]
}

/// How a board prints destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationCase {
    AsIs,
    Upper,
}

/// Destination text for display. Never modifies the train.
pub fn display_destination(train: &Train, case: DestinationCase) -> Cow<'_, str> {
    match case {
        DestinationCase::AsIs => Cow::Borrowed(&train.destination),
        DestinationCase::Upper => Cow::Owned(train.destination.to_uppercase()),
    }
}

/// A departure time split for styling.
///
/// # Examples
///
/// ```
/// use board_server::transform::TimeDisplay;
///
/// assert_eq!(
///     TimeDisplay::parse("5 min"),
///     TimeDisplay::Relative { value: "5", unit: " min" }
/// );
/// assert_eq!(TimeDisplay::parse("10:45"), TimeDisplay::Absolute("10:45"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeDisplay<'a> {
    /// `"<digits> min"`: the number and the unit suffix (with its leading
    /// space), which concatenate back to the input.
    Relative { value: &'a str, unit: &'a str },
    /// Anything else, shown unchanged.
    Absolute(&'a str),
}

impl<'a> TimeDisplay<'a> {
    pub fn parse(time: &'a str) -> Self {
        if let Some(digits) = time.strip_suffix(" min")
            && !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
        {
            return TimeDisplay::Relative {
                value: digits,
                unit: &time[digits.len()..],
            };
        }
        TimeDisplay::Absolute(time)
    }
}

/// Badge colour for a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeStyle {
    Primary,
    Secondary,
}

impl BadgeStyle {
    /// The C-10 line gets its own colour; every other line shares one.
    pub fn for_line(name: &str) -> Self {
        if name.to_lowercase().contains("c-10") {
            BadgeStyle::Secondary
        } else {
            BadgeStyle::Primary
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            BadgeStyle::Primary => "badge-primary",
            BadgeStyle::Secondary => "badge-secondary",
        }
    }
}

/// `text` repeated `times` times, for a seamless scrolling ticker.
pub fn repeat_banner(text: &str, times: usize) -> String {
    vec![text; times].join(BANNER_GAP)
}

/// Decorative train numbers for the marquee board.
///
/// The numbers are random and mean nothing. They are not part of the
/// schedule and carry no stability guarantee beyond this: they are drawn
/// again only when the board is handed a different schedule instance
/// (`Arc` identity), not on every render.
#[derive(Debug, Default)]
pub struct TrainNumbers {
    source: Option<Arc<Schedule>>,
    numbers: Vec<u32>,
}

impl TrainNumbers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Numbers for the rows of `schedule`, one per displayed row.
    pub fn numbers_for(&mut self, schedule: &Arc<Schedule>) -> &[u32] {
        self.numbers_for_with(schedule, &mut rand::thread_rng())
    }

    /// As [`numbers_for`](Self::numbers_for), with an explicit random source.
    pub fn numbers_for_with<R: Rng + ?Sized>(
        &mut self,
        schedule: &Arc<Schedule>,
        rng: &mut R,
    ) -> &[u32] {
        let unchanged = self
            .source
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, schedule));

        if !unchanged {
            let rows = limit_rows(schedule).len();
            self.numbers = (0..rows)
                .map(|_| rng.gen_range(TRAIN_NUMBER_RANGE))
                .collect();
            self.source = Some(schedule.clone());
        }

        &self.numbers
    }
}
