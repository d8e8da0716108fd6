//! Candle Interval Table
//!
//! Interval tokens accepted by the kline stream and the REST candle query,
//! and the fixed duration each token stands for.
//!
//! `1M` is a fixed 31-day approximation, not a calendar month. Bucketing
//! code that needs calendar months must do its own date arithmetic.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const MINUTE_MS: u64 = 60_000;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

/// Candle interval token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CandleInterval {
    /// 1 minute
    #[serde(rename = "1m")]
    OneMinute,
    /// 3 minutes
    #[serde(rename = "3m")]
    ThreeMinutes,
    /// 5 minutes
    #[serde(rename = "5m")]
    FiveMinutes,
    /// 15 minutes
    #[serde(rename = "15m")]
    FifteenMinutes,
    /// 30 minutes
    #[serde(rename = "30m")]
    ThirtyMinutes,
    /// 1 hour
    #[serde(rename = "1h")]
    OneHour,
    /// 2 hours
    #[serde(rename = "2h")]
    TwoHours,
    /// 4 hours
    #[serde(rename = "4h")]
    FourHours,
    /// 6 hours
    #[serde(rename = "6h")]
    SixHours,
    /// 8 hours
    #[serde(rename = "8h")]
    EightHours,
    /// 12 hours
    #[serde(rename = "12h")]
    TwelveHours,
    /// 1 day
    #[serde(rename = "1d")]
    OneDay,
    /// 3 days
    #[serde(rename = "3d")]
    ThreeDays,
    /// 1 week
    #[serde(rename = "1w")]
    OneWeek,
    /// 1 month (31 days)
    #[serde(rename = "1M")]
    OneMonth,
}

impl CandleInterval {
    /// Every interval, shortest first.
    pub const ALL: [Self; 15] = [
        Self::OneMinute,
        Self::ThreeMinutes,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::OneHour,
        Self::TwoHours,
        Self::FourHours,
        Self::SixHours,
        Self::EightHours,
        Self::TwelveHours,
        Self::OneDay,
        Self::ThreeDays,
        Self::OneWeek,
        Self::OneMonth,
    ];

    /// Wire token, e.g. `"15m"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::ThreeMinutes => "3m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::OneHour => "1h",
            Self::TwoHours => "2h",
            Self::FourHours => "4h",
            Self::SixHours => "6h",
            Self::EightHours => "8h",
            Self::TwelveHours => "12h",
            Self::OneDay => "1d",
            Self::ThreeDays => "3d",
            Self::OneWeek => "1w",
            Self::OneMonth => "1M",
        }
    }

    /// Duration in milliseconds.
    #[must_use]
    pub const fn duration_ms(self) -> u64 {
        match self {
            Self::OneMinute => MINUTE_MS,
            Self::ThreeMinutes => 3 * MINUTE_MS,
            Self::FiveMinutes => 5 * MINUTE_MS,
            Self::FifteenMinutes => 15 * MINUTE_MS,
            Self::ThirtyMinutes => 30 * MINUTE_MS,
            Self::OneHour => HOUR_MS,
            Self::TwoHours => 2 * HOUR_MS,
            Self::FourHours => 4 * HOUR_MS,
            Self::SixHours => 6 * HOUR_MS,
            Self::EightHours => 8 * HOUR_MS,
            Self::TwelveHours => 12 * HOUR_MS,
            Self::OneDay => DAY_MS,
            Self::ThreeDays => 3 * DAY_MS,
            Self::OneWeek => 7 * DAY_MS,
            Self::OneMonth => 31 * DAY_MS,
        }
    }

    /// Duration as a [`Duration`].
    #[must_use]
    pub const fn duration(self) -> Duration {
        Duration::from_millis(self.duration_ms())
    }

    /// Start of the candle containing `timestamp_ms`.
    ///
    /// Buckets are aligned to the Unix epoch, which matches the exchange for
    /// every interval except `1w` (Monday-aligned) and `1M` (calendar).
    #[must_use]
    pub const fn floor(self, timestamp_ms: u64) -> u64 {
        timestamp_ms - timestamp_ms % self.duration_ms()
    }
}

impl fmt::Display for CandleInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown interval token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown candle interval: {0:?}")]
pub struct ParseIntervalError(pub String);

impl FromStr for CandleInterval {
    type Err = ParseIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| ParseIntervalError(s.to_string()))
    }
}

/// Look up the duration in milliseconds of a raw interval token.
///
/// Tokens are case sensitive: `"1m"` is one minute, `"1M"` one month.
#[must_use]
pub fn candle_interval_duration(token: &str) -> Option<u64> {
    token.parse::<CandleInterval>().ok().map(CandleInterval::duration_ms)
}
