//! ATR (Average True Range) indicator

use crate::common::math::{self, ExponentialSmoother};
use crate::models::indicators::Candle;

/// Streaming ATR: exponentially smoothed true range.
///
/// The first candle has no previous close, so its true range is `high - low`.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    smoother: ExponentialSmoother,
    prev_close: Option<f64>,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            smoother: ExponentialSmoother::new(period),
            prev_close: None,
        }
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) -> f64 {
        let tr = math::true_range(high, low, self.prev_close);
        self.prev_close = Some(close);
        self.smoother.next(tr)
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// ATR series aligned with `candles`.
pub fn calculate_atr(candles: &[Candle], period: usize) -> Vec<f64> {
    let mut atr = Atr::new(period);
    candles
        .iter()
        .map(|c| atr.update(c.high, c.low, c.close))
        .collect()
}
