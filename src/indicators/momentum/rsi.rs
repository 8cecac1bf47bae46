//! RSI (Relative Strength Index) indicator
//!
//! RSI = 100 - (100 / (1 + RS)), RS = smoothed gain / smoothed loss.
//! Gains and losses are smoothed with the same exponential recurrence as the
//! EMA (factor `2 / (period + 1)`), both seeded at zero by the first candle.

use crate::common::math::ExponentialSmoother;
use crate::models::indicators::Candle;

/// Value reported when the smoothed loss is zero (no losses in the window).
pub const RSI_SATURATION: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    gains: ExponentialSmoother,
    losses: ExponentialSmoother,
    prev_close: Option<f64>,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            gains: ExponentialSmoother::new(period),
            losses: ExponentialSmoother::new(period),
            prev_close: None,
        }
    }

    pub fn update(&mut self, close: f64) -> f64 {
        let change = match self.prev_close {
            Some(prev) => close - prev,
            None => 0.0,
        };
        self.prev_close = Some(close);

        let avg_gain = self.gains.next(change.max(0.0));
        let avg_loss = self.losses.next((-change).max(0.0));

        rsi_from_averages(avg_gain, avg_loss)
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Oscillator value from smoothed gain and loss.
///
/// A zero loss saturates at [`RSI_SATURATION`] instead of dividing by zero.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        return RSI_SATURATION;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// RSI series aligned with `candles`.
pub fn calculate_rsi(candles: &[Candle], period: usize) -> Vec<f64> {
    let mut rsi = Rsi::new(period);
    candles.iter().map(|c| rsi.update(c.close)).collect()
}
