//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod signal;
pub mod timeframe;

pub use indicators::{AnnotatedCandle, Candle, IndicatorPeriods, IndicatorSnapshot};
pub use signal::{Signal, SignalDirection, SignalKind, TradeLevels};
pub use timeframe::Timeframe;
