//! Unit tests for ATR indicator

use crate::support::{candles_from_closes, constant_candles, ts};
use pulsefx::indicators::volatility::{calculate_atr, Atr};
use pulsefx::models::indicators::Candle;

#[test]
fn test_atr_first_value_is_range() {
    let candles = candles_from_closes(&[1.1000], 0.0010);
    let atr = calculate_atr(&candles, 14);
    assert!((atr[0] - 0.0020).abs() < 1e-12);
}

#[test]
fn test_atr_uses_previous_close_gap() {
    let candles = vec![
        Candle::new(1.0, 1.0, 1.0, 1.0, 0.0, ts(0)),
        Candle::new(1.5, 1.5, 1.5, 1.5, 0.0, ts(1)),
    ];
    // period 3: factor 0.5; tr0 = 0, tr1 = 0.5 -> 0.25
    let atr = calculate_atr(&candles, 3);
    assert_eq!(atr[0], 0.0);
    assert!((atr[1] - 0.25).abs() < 1e-12);
}

#[test]
fn test_atr_flat_market_is_zero() {
    let candles = constant_candles(30, 1.3);
    assert!(calculate_atr(&candles, 14).iter().all(|&v| v == 0.0));
}

#[test]
fn test_atr_streaming_matches_series() {
    let closes: Vec<f64> = (0..50).map(|i| 1.1 + 0.002 * ((i as f64) * 0.9).cos()).collect();
    let candles = candles_from_closes(&closes, 0.0007);
    let series = calculate_atr(&candles, 14);
    let mut atr = Atr::new(14);
    for (c, expected) in candles.iter().zip(&series) {
        assert_eq!(atr.update(c.high, c.low, c.close), *expected);
        assert!(*expected >= 0.0);
    }
    assert_eq!(atr.period(), 14);
}
