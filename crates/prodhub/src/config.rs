use std::{env, fmt, str::FromStr, time::Duration};

use prodhub_core::calendar::DEFAULT_UPCOMING_DAYS;

/// Which document store backs the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "inmemory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Document store backend (default: memory)
    pub store_backend: StoreBackend,
    /// Path to SQLite database file (default: "prodhub.db")
    pub sqlite_path: String,
    /// Seconds between reminder checks (default: 60)
    pub notification_check_interval_seconds: u64,
    /// Look-ahead of the upcoming events view, in days (default: 7)
    pub upcoming_event_days: i64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STORE_BACKEND` - `memory` or `sqlite` (default: memory)
    /// - `SQLITE_PATH` - SQLite database path (default: "prodhub.db")
    /// - `NOTIFICATION_CHECK_INTERVAL_SECONDS` - Reminder poll interval (default: 60)
    /// - `UPCOMING_EVENT_DAYS` - Upcoming events look-ahead (default: 7)
    pub fn from_env() -> Self {
        Self {
            store_backend: env::var("STORE_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "prodhub.db".to_string()),
            notification_check_interval_seconds: env::var("NOTIFICATION_CHECK_INTERVAL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(60),
            upcoming_event_days: env::var("UPCOMING_EVENT_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_UPCOMING_DAYS),
        }
    }

    /// Get the reminder poll interval as a Duration.
    pub fn notification_check_interval(&self) -> Duration {
        Duration::from_secs(self.notification_check_interval_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
