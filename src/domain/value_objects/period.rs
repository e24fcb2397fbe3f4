//! Statistics periods and the time windows they resolve to.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Lower bound of the `all` period: 2000-01-01T00:00:00Z.
pub const ALL_TIME_FLOOR_TIMESTAMP: i64 = 946_684_800;

/// A closed time interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    /// Midnight UTC of `now` up to `now`.
    pub fn today(now: DateTime<Utc>) -> Self {
        Self {
            start: start_of_day(now),
            end: now,
        }
    }
}

/// Midnight UTC of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Period selector for statistics requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    #[default]
    Today,
    Week,
    All,
}

impl StatsPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::All => "all",
        }
    }

    /// Resolve the period against a reference instant.
    pub fn window(&self, now: DateTime<Utc>) -> TimeWindow {
        let start = match self {
            Self::Today => start_of_day(now),
            Self::Week => now - TimeDelta::days(7),
            Self::All => DateTime::from_timestamp(ALL_TIME_FLOOR_TIMESTAMP, 0)
                .unwrap_or(DateTime::UNIX_EPOCH),
        };
        TimeWindow { start, end: now }
    }
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unrecognized period string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid period '{0}', expected one of: today, week, all")]
pub struct InvalidPeriod(pub String);

impl FromStr for StatsPeriod {
    type Err = InvalidPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "all" => Ok(Self::All),
            _ => Err(InvalidPeriod(s.to_string())),
        }
    }
}
