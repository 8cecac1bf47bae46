//! Unit tests for the shared smoothing and range primitives

use pulsefx::common::math::{ema_series, smoothing_factor, true_range, ExponentialSmoother};

#[test]
fn smoothing_factor_is_two_over_period_plus_one() {
    assert_eq!(smoothing_factor(1), 1.0);
    assert!((smoothing_factor(14) - 2.0 / 15.0).abs() < 1e-15);
    assert!((smoothing_factor(20) - 2.0 / 21.0).abs() < 1e-15);
}

#[test]
fn smoother_is_seeded_by_first_value() {
    let mut s = ExponentialSmoother::new(3);
    assert_eq!(s.value(), None);
    assert_eq!(s.next(10.0), 10.0);
    // factor 0.5: 10 + 0.5 * (20 - 10)
    assert_eq!(s.next(20.0), 15.0);
    assert_eq!(s.next(15.0), 15.0);
    assert_eq!(s.value(), Some(15.0));
}

#[test]
fn period_one_tracks_input_exactly() {
    let values = [1.0, 5.0, -2.0, 7.5];
    assert_eq!(ema_series(&values, 1), values.to_vec());
}

#[test]
fn true_range_without_previous_close_is_high_minus_low() {
    assert!((true_range(1.2, 1.0, None) - 0.2).abs() < 1e-12);
}

#[test]
fn true_range_uses_gaps_against_previous_close() {
    // Gap up: |high - prev_close| dominates.
    assert!((true_range(1.5, 1.4, Some(1.0)) - 0.5).abs() < 1e-12);
    // Gap down: |low - prev_close| dominates.
    assert!((true_range(1.0, 0.9, Some(1.3)) - 0.4).abs() < 1e-12);
    // Inside bar: plain range.
    assert!((true_range(1.3, 1.0, Some(1.1)) - 0.3).abs() < 1e-12);
}
