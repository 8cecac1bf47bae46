use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
}

impl Timeframe {
    pub fn minutes(&self) -> i64 {
        match self {
            Timeframe::OneMinute => 1,
            Timeframe::FiveMinutes => 5,
            Timeframe::FifteenMinutes => 15,
            Timeframe::ThirtyMinutes => 30,
            Timeframe::OneHour => 60,
            Timeframe::FourHours => 240,
            Timeframe::OneDay => 1440,
        }
    }

    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.minutes())
    }

    /// Interval string understood by Twelve Data.
    pub fn provider_interval(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1min",
            Timeframe::FiveMinutes => "5min",
            Timeframe::FifteenMinutes => "15min",
            Timeframe::ThirtyMinutes => "30min",
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
            Timeframe::OneDay => "1day",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1m",
            Timeframe::FiveMinutes => "5m",
            Timeframe::FifteenMinutes => "15m",
            Timeframe::ThirtyMinutes => "30m",
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
            Timeframe::OneDay => "1d",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1m" | "1min" => Ok(Timeframe::OneMinute),
            "5m" | "5min" => Ok(Timeframe::FiveMinutes),
            "15m" | "15min" => Ok(Timeframe::FifteenMinutes),
            "30m" | "30min" => Ok(Timeframe::ThirtyMinutes),
            "1h" | "60min" => Ok(Timeframe::OneHour),
            "4h" => Ok(Timeframe::FourHours),
            "1d" | "1day" => Ok(Timeframe::OneDay),
            other => Err(format!("unsupported timeframe '{}'", other)),
        }
    }
}
