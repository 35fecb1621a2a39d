//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::board::BoardSettings;
use crate::poll::PollConfig;
use crate::schedule::{DEFAULT_BASE_URL, ScheduleConfig};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
const DEFAULT_PAGE_REFRESH_SECS: u64 = 1;
const DEFAULT_BOARD_IDLE_SECS: u64 = 120;
const DEFAULT_STATIC_DIR: &str = "static";

/// Errors reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { var: &'static str, value: String },

    #[error("{var} must be greater than zero")]
    ZeroSeconds { var: &'static str },

    #[error("BIND_ADDR is not a socket address: {value:?}")]
    InvalidBindAddr { value: String },

    #[error("SCHEDULE_BASE_URL must start with http:// or https://, got {value:?}")]
    InvalidBaseUrl { value: String },
}

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    pub schedule: ScheduleConfig,
    pub poll_interval: Duration,
    pub bind_addr: SocketAddr,
    /// Seconds between automatic page reloads.
    pub page_refresh_secs: u64,
    /// How long a board may go unviewed before polling stops.
    pub board_idle: Duration,
    /// Serve schedules from JSON files in this directory instead of HTTP.
    pub mock_schedule_dir: Option<PathBuf>,
    pub static_dir: PathBuf,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            schedule: ScheduleConfig::default(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            page_refresh_secs: DEFAULT_PAGE_REFRESH_SECS,
            board_idle: Duration::from_secs(DEFAULT_BOARD_IDLE_SECS),
            mock_schedule_dir: None,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl BoardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`. Unset or blank variables take
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let base_url = get("SCHEDULE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl { value: base_url });
        }

        let seconds = |var: &'static str, default: u64| -> Result<u64, ConfigError> {
            let Some(value) = get(var) else {
                return Ok(default);
            };
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeconds {
                    var,
                    value: value.clone(),
                })?;
            if secs == 0 {
                return Err(ConfigError::ZeroSeconds { var });
            }
            Ok(secs)
        };

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr { value: bind_addr })?;

        Ok(Self {
            schedule: ScheduleConfig::new(base_url)
                .with_timeout(seconds("SCHEDULE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?),
            poll_interval: Duration::from_secs(seconds(
                "POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL_SECS,
            )?),
            bind_addr,
            page_refresh_secs: seconds("PAGE_REFRESH_SECS", DEFAULT_PAGE_REFRESH_SECS)?,
            board_idle: Duration::from_secs(seconds("BOARD_IDLE_SECS", DEFAULT_BOARD_IDLE_SECS)?),
            mock_schedule_dir: get("MOCK_SCHEDULE_DIR").map(PathBuf::from),
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_mock_schedule_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mock_schedule_dir = Some(dir.into());
        self
    }

    pub fn with_page_refresh_secs(mut self, secs: u64) -> Self {
        self.page_refresh_secs = secs;
        self
    }

    pub fn with_board_idle(mut self, idle: Duration) -> Self {
        self.board_idle = idle;
        self
    }

    /// Settings for the boards built from this configuration.
    pub fn board_settings(&self) -> BoardSettings {
        BoardSettings::new(PollConfig {
            interval: self.poll_interval,
            ..PollConfig::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn config_defaults() {
        let config = BoardConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.schedule.base_url, "http://localhost:8080");
        assert_eq!(config.schedule.timeout_secs, 10);
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.page_refresh_secs, 1);
        assert_eq!(config.board_idle, Duration::from_secs(120));
        assert!(config.mock_schedule_dir.is_none());
    }

    #[test]
    fn config_from_vars() {
        let config = BoardConfig::from_lookup(lookup(&[
            ("SCHEDULE_BASE_URL", "https://trains.example"),
            ("SCHEDULE_TIMEOUT_SECS", "3"),
            ("POLL_INTERVAL_SECS", " 15 "),
            ("BIND_ADDR", "0.0.0.0:8000"),
            ("MOCK_SCHEDULE_DIR", "data/mock_schedules"),
            ("STATIC_DIR", "/srv/static"),
        ]))
        .unwrap();

        assert_eq!(config.schedule.base_url, "https://trains.example");
        assert_eq!(config.schedule.timeout_secs, 3);
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(
            config.mock_schedule_dir,
            Some(PathBuf::from("data/mock_schedules"))
        );
        assert_eq!(config.static_dir, PathBuf::from("/srv/static"));
    }

    #[test]
    fn blank_values_take_defaults() {
        let config = BoardConfig::from_lookup(lookup(&[
            ("POLL_INTERVAL_SECS", ""),
            ("MOCK_SCHEDULE_DIR", "  "),
        ]))
        .unwrap();

        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert!(config.mock_schedule_dir.is_none());
    }

    #[test]
    fn invalid_values() {
        assert_eq!(
            BoardConfig::from_lookup(lookup(&[("POLL_INTERVAL_SECS", "soon")])),
            Err(ConfigError::InvalidSeconds {
                var: "POLL_INTERVAL_SECS",
                value: "soon".to_string()
            })
        );
        assert_eq!(
            BoardConfig::from_lookup(lookup(&[("BOARD_IDLE_SECS", "0")])),
            Err(ConfigError::ZeroSeconds {
                var: "BOARD_IDLE_SECS"
            })
        );
        assert!(matches!(
            BoardConfig::from_lookup(lookup(&[("BIND_ADDR", "localhost")])),
            Err(ConfigError::InvalidBindAddr { .. })
        ));
        assert!(matches!(
            BoardConfig::from_lookup(lookup(&[("SCHEDULE_BASE_URL", "localhost:8080")])),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn config_builder() {
        let config = BoardConfig::new()
            .with_poll_interval(Duration::from_secs(5))
            .with_mock_schedule_dir("fixtures")
            .with_page_refresh_secs(2)
            .with_board_idle(Duration::from_secs(10));

        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.page_refresh_secs, 2);
        assert_eq!(config.board_idle, Duration::from_secs(10));
        assert_eq!(
            config.board_settings().poll.interval,
            Duration::from_secs(5)
        );
    }
}
