//! Slow-timeframe trend bias.

use crate::models::indicators::{AnnotatedCandle, IndicatorSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum number of annotated candles before a reading is considered valid.
pub const MIN_TREND_SNAPSHOTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendBias {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for TrendBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendBias::Bullish => write!(f, "bullish"),
            TrendBias::Bearish => write!(f, "bearish"),
            TrendBias::Neutral => write!(f, "neutral"),
        }
    }
}

/// Output of [`classify_trend`].
///
/// `valid` is false when the sequence is too short to read; such a reading is
/// always `Neutral` but must not be confused with a genuine neutral market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReading {
    pub bias: TrendBias,
    pub valid: bool,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub close: Option<f64>,
}

impl TrendReading {
    fn insufficient() -> Self {
        Self {
            bias: TrendBias::Neutral,
            valid: false,
            ema_fast: None,
            ema_slow: None,
            close: None,
        }
    }

    /// A valid, directional reading that entry rules can act on.
    pub fn is_actionable(&self) -> bool {
        self.valid && self.bias != TrendBias::Neutral
    }
}

/// Bias from one snapshot and its close.
pub fn bias_from_snapshot(snapshot: &IndicatorSnapshot, close: f64) -> TrendBias {
    if snapshot.ema_fast > snapshot.ema_slow && close > snapshot.ema_slow {
        TrendBias::Bullish
    } else if snapshot.ema_fast < snapshot.ema_slow && close < snapshot.ema_slow {
        TrendBias::Bearish
    } else {
        TrendBias::Neutral
    }
}

/// Classify the trend from the latest annotated candle of the slow timeframe.
pub fn classify_trend(series: &[AnnotatedCandle]) -> TrendReading {
    if series.len() < MIN_TREND_SNAPSHOTS {
        return TrendReading::insufficient();
    }
    let Some(last) = series.last() else {
        return TrendReading::insufficient();
    };

    TrendReading {
        bias: bias_from_snapshot(&last.indicators, last.close()),
        valid: true,
        ema_fast: Some(last.indicators.ema_fast),
        ema_slow: Some(last.indicators.ema_slow),
        close: Some(last.close()),
    }
}
