use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Indicator values derived for a single candle index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub atr: f64,
}

/// A candle together with the indicator snapshot computed up to and including it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedCandle {
    pub candle: Candle,
    pub indicators: IndicatorSnapshot,
}

impl AnnotatedCandle {
    pub fn close(&self) -> f64 {
        self.candle.close
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.candle.timestamp
    }
}

/// Periods used when annotating a candle sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorPeriods {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi: usize,
    pub atr: usize,
}

impl Default for IndicatorPeriods {
    fn default() -> Self {
        Self {
            ema_fast: 20,
            ema_slow: 50,
            rsi: 14,
            atr: 14,
        }
    }
}
