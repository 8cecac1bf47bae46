//! EMA (Exponential Moving Average) indicator

use crate::common::math::{self, ExponentialSmoother};
use crate::models::indicators::Candle;

/// Streaming EMA over closing prices, seeded by the first close.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    smoother: ExponentialSmoother,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            smoother: ExponentialSmoother::new(period),
        }
    }

    pub fn update(&mut self, close: f64) -> f64 {
        self.smoother.next(close)
    }

    pub fn value(&self) -> Option<f64> {
        self.smoother.value()
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// EMA series aligned with `candles`.
pub fn calculate_ema(candles: &[Candle], period: usize) -> Vec<f64> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    math::ema_series(&closes, period)
}

