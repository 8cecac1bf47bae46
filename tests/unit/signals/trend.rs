//! Unit tests for the trend classifier

use crate::support::{annotated, bearish_slow, bullish_slow};
use pulsefx::indicators::compute;
use pulsefx::models::indicators::{IndicatorPeriods, IndicatorSnapshot};
use pulsefx::signals::trend::{bias_from_snapshot, classify_trend, TrendBias};

fn snapshot(ema_fast: f64, ema_slow: f64) -> IndicatorSnapshot {
    IndicatorSnapshot {
        ema_fast,
        ema_slow,
        rsi: 50.0,
        atr: 0.001,
    }
}

#[test]
fn bullish_requires_fast_over_slow_and_close_over_slow() {
    assert_eq!(bias_from_snapshot(&snapshot(1.1050, 1.1020), 1.1060), TrendBias::Bullish);
    // Close below the slow average breaks the bullish reading.
    assert_eq!(bias_from_snapshot(&snapshot(1.1050, 1.1020), 1.1010), TrendBias::Neutral);
}

#[test]
fn bearish_requires_fast_under_slow_and_close_under_slow() {
    assert_eq!(bias_from_snapshot(&snapshot(1.0990, 1.1020), 1.0980), TrendBias::Bearish);
    assert_eq!(bias_from_snapshot(&snapshot(1.0990, 1.1020), 1.1030), TrendBias::Neutral);
}

#[test]
fn equal_averages_are_neutral() {
    assert_eq!(bias_from_snapshot(&snapshot(1.1, 1.1), 1.2), TrendBias::Neutral);
    assert_eq!(bias_from_snapshot(&snapshot(1.1, 1.1), 1.0), TrendBias::Neutral);
}

#[test]
fn classifier_reads_only_the_last_snapshot() {
    let reading = classify_trend(&bullish_slow());
    assert_eq!(reading.bias, TrendBias::Bullish);
    assert!(reading.valid);
    assert!(reading.is_actionable());
    assert_eq!(reading.ema_fast, Some(1.1050));
    assert_eq!(reading.ema_slow, Some(1.1020));
    assert_eq!(reading.close, Some(1.1060));

    let mut series = bearish_slow();
    series.insert(0, bullish_slow()[1]);
    assert_eq!(classify_trend(&series).bias, TrendBias::Bearish);
}

#[test]
fn short_history_is_invalid_not_neutral() {
    let reading = classify_trend(&[annotated(1.1060, 1.1050, 1.1020, 50.0, 0.001)]);
    assert_eq!(reading.bias, TrendBias::Neutral);
    assert!(!reading.valid);
    assert!(!reading.is_actionable());
    assert_eq!(reading.ema_fast, None);

    assert!(!classify_trend(&[]).valid);
}

#[test]
fn genuine_neutral_is_valid_but_not_actionable() {
    let series = vec![
        annotated(1.1, 1.1, 1.1, 50.0, 0.001),
        annotated(1.1, 1.1, 1.1, 50.0, 0.001),
    ];
    let reading = classify_trend(&series);
    assert!(reading.valid);
    assert_eq!(reading.bias, TrendBias::Neutral);
    assert!(!reading.is_actionable());
}

#[test]
fn rising_market_classifies_bullish() {
    let candles = crate::support::trending_candles(120, 1.05, 0.0002);
    let series = compute(&candles, IndicatorPeriods::default()).unwrap();
    assert_eq!(classify_trend(&series).bias, TrendBias::Bullish);
}

#[test]
fn bias_display_is_lowercase() {
    assert_eq!(TrendBias::Bullish.to_string(), "bullish");
    assert_eq!(TrendBias::Bearish.to_string(), "bearish");
    assert_eq!(TrendBias::Neutral.to_string(), "neutral");
}
