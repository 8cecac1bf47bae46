//! Unit tests for EMA indicator

use crate::support::trending_candles;
use pulsefx::indicators::trend::{calculate_ema, Ema};

#[test]
fn test_ema_first_value_is_first_close() {
    let candles = trending_candles(5, 1.1000, 0.0010);
    let series = calculate_ema(&candles, 20);
    assert_eq!(series.len(), 5);
    assert_eq!(series[0], 1.1000);
}

#[test]
fn test_ema_streaming_matches_series() {
    let candles = trending_candles(40, 1.2000, -0.0003);
    let series = calculate_ema(&candles, 12);
    let mut ema = Ema::new(12);
    for (candle, expected) in candles.iter().zip(&series) {
        assert_eq!(ema.update(candle.close), *expected);
    }
    assert_eq!(ema.value(), series.last().copied());
    assert_eq!(ema.period(), 12);
}

#[test]
fn test_ema_lags_a_rising_series() {
    let candles = trending_candles(60, 100.0, 0.5);
    let last_close = candles.last().unwrap().close;
    let series = calculate_ema(&candles, 20);
    let last = *series.last().unwrap();
    assert!(last < last_close);
    assert!(series.windows(2).all(|w| w[1] > w[0]));
}

