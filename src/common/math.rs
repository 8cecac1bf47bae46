//! Smoothing and range primitives.

/// Smoothing factor for a span-style exponential average: `2 / (period + 1)`.
pub fn smoothing_factor(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Exponential smoothing recurrence seeded by the first observation.
///
/// `value[0] = x[0]`, `value[i] = value[i-1] + factor * (x[i] - value[i-1])`.
/// Every smoothed series in the crate (averages, gain/loss, true range) goes
/// through this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialSmoother {
    factor: f64,
    value: Option<f64>,
}

impl ExponentialSmoother {
    pub fn new(period: usize) -> Self {
        Self {
            factor: smoothing_factor(period),
            value: None,
        }
    }

    /// Feed one observation and return the smoothed value.
    pub fn next(&mut self, x: f64) -> f64 {
        let smoothed = match self.value {
            None => x,
            Some(prev) => prev + self.factor * (x - prev),
        };
        self.value = Some(smoothed);
        smoothed
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }
}

/// Smooth a whole series in one pass.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut smoother = ExponentialSmoother::new(period);
    values.iter().map(|&v| smoother.next(v)).collect()
}

/// True range of one candle.
///
/// Without a previous close (first candle of a sequence) this is `high - low`.
pub fn true_range(high: f64, low: f64, prev_close: Option<f64>) -> f64 {
    let range = high - low;
    match prev_close {
        Some(pc) => range.max((high - pc).abs()).max((low - pc).abs()),
        None => range,
    }
}
