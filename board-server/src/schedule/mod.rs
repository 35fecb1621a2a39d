//! Schedule fetching.
//!
//! Translates a station identifier into a [`Schedule`] or a [`FetchError`].
//! Nothing here caches or retries: a fetch is exactly one request.

mod client;
mod error;
mod mock;
mod types;

use std::future::Future;

pub use client::{DEFAULT_BASE_URL, ScheduleClient, ScheduleConfig, decode_schedule};
pub use error::{FetchError, FetchErrorKind};
pub use mock::{MockLoadError, MockScheduleSource};
pub use types::{EmptyStationId, Schedule, StationId, Train};

/// Something that can produce the current schedule for a station.
pub trait ScheduleSource: Send + Sync + 'static {
    fn fetch(
        &self,
        station: &StationId,
    ) -> impl Future<Output = Result<Schedule, FetchError>> + Send;
}

/// Fetch a schedule for an optional route parameter.
///
/// An absent or blank identifier short-circuits with
/// [`FetchError::NotReady`] without touching the source.
pub async fn fetch_station<S: ScheduleSource>(
    source: &S,
    station: Option<&str>,
) -> Result<Schedule, FetchError> {
    let Some(station) = StationId::from_param(station) else {
        return Err(FetchError::NotReady);
    };
    source.fetch(&station).await
}

/// The schedule source the server runs against.
#[derive(Debug, Clone)]
pub enum Backend {
    /// The live schedule endpoint.
    Http(ScheduleClient),
    /// JSON files on disk, for development.
    Mock(MockScheduleSource),
}

impl ScheduleSource for Backend {
    fn fetch(
        &self,
        station: &StationId,
    ) -> impl Future<Output = Result<Schedule, FetchError>> + Send {
        async move {
            match self {
                Backend::Http(client) => client.get_schedule(station).await,
                Backend::Mock(mock) => mock.get_schedule(station).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FakeSource;

    #[tokio::test]
    async fn blank_station_never_fetches() {
        let source = FakeSource::new();

        assert_eq!(
            fetch_station(&source, None).await,
            Err(FetchError::NotReady)
        );
        assert_eq!(
            fetch_station(&source, Some("   ")).await,
            Err(FetchError::NotReady)
        );
        assert_eq!(source.total_calls(), 0);
    }

    #[tokio::test]
    async fn station_is_forwarded() {
        let source = FakeSource::new();
        source.respond_ok("ABC", 3);

        let schedule = fetch_station(&source, Some("ABC")).await.unwrap();
        assert_eq!(schedule.station, "ABC");
        assert_eq!(schedule.trains.len(), 3);
        assert_eq!(source.calls_for("ABC"), 1);
    }
}
