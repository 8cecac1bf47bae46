//! Fast-timeframe entry rules.
//!
//! Given a directional bias, the last two annotated candles decide between a
//! `ready` alert (pullback to the fast EMA with an RSI midline cross inside the
//! zone) and a confirmed `entry` (same cross, candle closed through the EMA).

use crate::config::StrategyConfig;
use crate::models::indicators::AnnotatedCandle;
use crate::models::signal::{SignalDirection, SignalKind, TradeLevels};
use crate::signals::trend::TrendBias;
use tracing::debug;

/// Minimum annotated candles on the entry timeframe.
pub const MIN_ENTRY_SNAPSHOTS: usize = 2;

/// Individual rule outcomes for one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleChecks {
    pub direction: SignalDirection,
    pub price_near_fast_ema: bool,
    pub rsi_in_zone: bool,
    pub rsi_crossed_midline: bool,
    pub closed_beyond_fast_ema: bool,
}

impl RuleChecks {
    pub fn evaluate(
        direction: SignalDirection,
        previous: &AnnotatedCandle,
        current: &AnnotatedCandle,
        config: &StrategyConfig,
    ) -> Self {
        let close = current.close();
        let ema_fast = current.indicators.ema_fast;
        let rsi = current.indicators.rsi;
        let prev_rsi = previous.indicators.rsi;
        let midline = config.rsi_midline;

        let (zone, rsi_crossed_midline, closed_beyond_fast_ema) = match direction {
            SignalDirection::Buy => (
                config.rsi_buy_zone,
                prev_rsi <= midline && midline < rsi,
                close > ema_fast,
            ),
            SignalDirection::Sell => (
                config.rsi_sell_zone,
                prev_rsi >= midline && midline > rsi,
                close < ema_fast,
            ),
        };

        Self {
            direction,
            price_near_fast_ema: (close - ema_fast).abs() <= config.ema_proximity,
            rsi_in_zone: zone.contains(rsi),
            rsi_crossed_midline,
            closed_beyond_fast_ema,
        }
    }

    /// Anticipatory setup; does not need the close through the EMA.
    pub fn ready(&self) -> bool {
        self.price_near_fast_ema && self.rsi_in_zone && self.rsi_crossed_midline
    }

    pub fn entry(&self) -> bool {
        self.price_near_fast_ema && self.rsi_crossed_midline && self.closed_beyond_fast_ema
    }
}

/// A signal the rules produced, before it is stamped with symbol and time.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDecision {
    pub kind: SignalKind,
    pub price: f64,
    pub rationale: String,
    pub levels: Option<TradeLevels>,
    pub checks: RuleChecks,
}

pub struct EntryRuleEvaluator {
    config: StrategyConfig,
}

impl EntryRuleEvaluator {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Evaluate the fast timeframe under `bias`. At most one decision is returned;
    /// the buy rules are tried before the sell rules.
    pub fn evaluate(&self, fast: &[AnnotatedCandle], bias: TrendBias) -> Option<EntryDecision> {
        if bias == TrendBias::Neutral || fast.len() < MIN_ENTRY_SNAPSHOTS {
            return None;
        }
        let current = &fast[fast.len() - 1];
        let previous = &fast[fast.len() - 2];

        if current.indicators.atr < self.config.atr_min_value {
            debug!(
                atr = current.indicators.atr,
                floor = self.config.atr_min_value,
                "ATR below floor, skipping entry rules"
            );
            return None;
        }

        self.evaluate_direction(SignalDirection::Buy, bias, previous, current)
            .or_else(|| self.evaluate_direction(SignalDirection::Sell, bias, previous, current))
    }

    fn evaluate_direction(
        &self,
        direction: SignalDirection,
        bias: TrendBias,
        previous: &AnnotatedCandle,
        current: &AnnotatedCandle,
    ) -> Option<EntryDecision> {
        let required = match direction {
            SignalDirection::Buy => TrendBias::Bullish,
            SignalDirection::Sell => TrendBias::Bearish,
        };
        if bias != required {
            return None;
        }

        let checks = RuleChecks::evaluate(direction, previous, current, &self.config);
        debug!(?checks, "entry rule checks");
        let price = current.close();

        if checks.ready() && self.config.enable_ready_alert {
            return Some(EntryDecision {
                kind: SignalKind::ready(direction),
                price,
                rationale: self.ready_rationale(direction, bias, previous, current),
                levels: None,
                checks,
            });
        }

        if checks.entry() {
            let levels = TradeLevels::from_offsets(
                direction,
                price,
                self.config.stop_loss_offset,
                self.config.take_profit_offset,
            );
            return Some(EntryDecision {
                kind: SignalKind::entry(direction),
                price,
                rationale: self.entry_rationale(direction, bias, current, &levels),
                levels: Some(levels),
                checks,
            });
        }

        None
    }

    fn ready_rationale(
        &self,
        direction: SignalDirection,
        bias: TrendBias,
        previous: &AnnotatedCandle,
        current: &AnnotatedCandle,
    ) -> String {
        let (title, side) = match direction {
            SignalDirection::Buy => ("Ready to buy", "above"),
            SignalDirection::Sell => ("Ready to sell", "below"),
        };
        [
            title.to_string(),
            format!("- Trend: {}", bias),
            format!(
                "- Price near EMA fast: {:.5} ~ {:.5}",
                current.close(),
                current.indicators.ema_fast
            ),
            format!(
                "- RSI crossed {} {:.1}: {:.1} -> {:.1}",
                side, self.config.rsi_midline, previous.indicators.rsi, current.indicators.rsi
            ),
            format!("- Wait for a candle close {} EMA fast", side),
        ]
        .join("\n")
    }

    fn entry_rationale(
        &self,
        direction: SignalDirection,
        bias: TrendBias,
        current: &AnnotatedCandle,
        levels: &TradeLevels,
    ) -> String {
        let (title, side) = match direction {
            SignalDirection::Buy => ("Entry buy", "above"),
            SignalDirection::Sell => ("Entry sell", "below"),
        };
        [
            title.to_string(),
            format!("- Trend: {}", bias),
            format!("- Price: {:.5}", current.close()),
            format!("- EMA fast: {:.5}", current.indicators.ema_fast),
            format!("- RSI: {:.1}", current.indicators.rsi),
            format!("- Candle closed {} EMA fast", side),
            format!("- Stop loss: {:.5}", levels.stop_loss),
            format!("- Take profit: {:.5}", levels.take_profit),
        ]
        .join("\n")
    }
}
