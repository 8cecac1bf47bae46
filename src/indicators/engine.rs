//! Annotates a candle sequence with EMA fast/slow, RSI and ATR.
//!
//! Each snapshot depends only on candles at or before its index. The full
//! computation is a fold of [`IndicatorState`] over the sequence, so feeding
//! candles incrementally yields exactly the same values.

use crate::indicators::error::IndicatorError;
use crate::indicators::momentum::Rsi;
use crate::indicators::trend::Ema;
use crate::indicators::volatility::Atr;
use crate::models::indicators::{AnnotatedCandle, Candle, IndicatorPeriods, IndicatorSnapshot};
use chrono::{DateTime, Utc};

/// Running indicator accumulators for one instrument and timeframe.
#[derive(Debug, Clone)]
pub struct IndicatorState {
    ema_fast: Ema,
    ema_slow: Ema,
    rsi: Rsi,
    atr: Atr,
    last_timestamp: Option<DateTime<Utc>>,
    processed: usize,
}

impl IndicatorState {
    pub fn new(periods: IndicatorPeriods) -> Result<Self, IndicatorError> {
        validate_periods(&periods)?;
        Ok(Self {
            ema_fast: Ema::new(periods.ema_fast),
            ema_slow: Ema::new(periods.ema_slow),
            rsi: Rsi::new(periods.rsi),
            atr: Atr::new(periods.atr),
            last_timestamp: None,
            processed: 0,
        })
    }

    /// Advance by one candle. Rejects malformed candles without touching state.
    pub fn update(&mut self, candle: &Candle) -> Result<IndicatorSnapshot, IndicatorError> {
        validate_candle(self.processed, candle, self.last_timestamp)?;

        let snapshot = IndicatorSnapshot {
            ema_fast: self.ema_fast.update(candle.close),
            ema_slow: self.ema_slow.update(candle.close),
            rsi: self.rsi.update(candle.close),
            atr: self.atr.update(candle.high, candle.low, candle.close),
        };
        self.last_timestamp = Some(candle.timestamp);
        self.processed += 1;
        Ok(snapshot)
    }

    /// Timestamp of the last candle folded in, if any.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_timestamp
    }

    pub fn processed(&self) -> usize {
        self.processed
    }
}

/// Stateless entry point that recomputes from full history on each call.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorEngine {
    periods: IndicatorPeriods,
}

impl IndicatorEngine {
    pub fn new(periods: IndicatorPeriods) -> Result<Self, IndicatorError> {
        validate_periods(&periods)?;
        Ok(Self { periods })
    }

    pub fn periods(&self) -> IndicatorPeriods {
        self.periods
    }

    pub fn compute(&self, candles: &[Candle]) -> Result<Vec<AnnotatedCandle>, IndicatorError> {
        compute(candles, self.periods)
    }
}

/// Annotate `candles` with indicator snapshots, one per candle.
pub fn compute(
    candles: &[Candle],
    periods: IndicatorPeriods,
) -> Result<Vec<AnnotatedCandle>, IndicatorError> {
    let mut state = IndicatorState::new(periods)?;
    candles
        .iter()
        .map(|candle| {
            state.update(candle).map(|indicators| AnnotatedCandle {
                candle: *candle,
                indicators,
            })
        })
        .collect()
}

fn validate_periods(periods: &IndicatorPeriods) -> Result<(), IndicatorError> {
    let checks = [
        ("ema_fast", periods.ema_fast),
        ("ema_slow", periods.ema_slow),
        ("rsi", periods.rsi),
        ("atr", periods.atr),
    ];
    match checks.iter().find(|(_, period)| *period == 0) {
        Some((name, _)) => Err(IndicatorError::InvalidPeriod { name: *name }),
        None => Ok(()),
    }
}

fn validate_candle(
    index: usize,
    candle: &Candle,
    previous: Option<DateTime<Utc>>,
) -> Result<(), IndicatorError> {
    let fields = [
        ("open", candle.open),
        ("high", candle.high),
        ("low", candle.low),
        ("close", candle.close),
    ];
    if let Some((field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
        return Err(IndicatorError::NonFinitePrice {
            index,
            field: *field,
        });
    }
    if candle.high < candle.low {
        return Err(IndicatorError::InvertedRange {
            index,
            high: candle.high,
            low: candle.low,
        });
    }
    // Equal timestamps are tolerated as consecutive duplicates.
    if let Some(previous) = previous {
        if candle.timestamp < previous {
            return Err(IndicatorError::OutOfOrder {
                index,
                timestamp: candle.timestamp,
                previous,
            });
        }
    }
    Ok(())
}
