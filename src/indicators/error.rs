use chrono::{DateTime, Utc};
use thiserror::Error;

/// Precondition violations detected while annotating a candle sequence.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("{name} period must be at least 1")]
    InvalidPeriod { name: &'static str },

    #[error("candle {index} has a non-finite {field}")]
    NonFinitePrice { index: usize, field: &'static str },

    #[error("candle {index} has high {high} below low {low}")]
    InvertedRange { index: usize, high: f64, low: f64 },

    #[error("candle {index} at {timestamp} precedes the previous candle at {previous}")]
    OutOfOrder {
        index: usize,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },
}
