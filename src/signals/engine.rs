//! Main signal evaluation engine: trend bias, entry rules and cooldown.

use crate::config::StrategyConfig;
use crate::indicators::{IndicatorEngine, IndicatorError};
use crate::models::indicators::{AnnotatedCandle, Candle};
use crate::models::signal::Signal;
use crate::signals::cooldown::{CooldownState, CooldownTracker};
use crate::signals::entry::EntryRuleEvaluator;
use crate::signals::trend::{classify_trend, TrendReading};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Multi-timeframe signal state machine.
///
/// Holds the only mutable state of the core, the cooldown record. `evaluate`
/// takes `&self`, so one engine can be shared across tasks.
pub struct SignalEngine {
    indicators: IndicatorEngine,
    evaluator: EntryRuleEvaluator,
    cooldown: CooldownTracker,
}

impl SignalEngine {
    pub fn new(config: StrategyConfig) -> Result<Self, IndicatorError> {
        let indicators = IndicatorEngine::new(config.periods)?;
        let cooldown = CooldownTracker::new(config.cooldown_window());
        Ok(Self {
            indicators,
            evaluator: EntryRuleEvaluator::new(config),
            cooldown,
        })
    }

    pub fn config(&self) -> &StrategyConfig {
        self.evaluator.config()
    }

    pub fn cooldown(&self) -> &CooldownTracker {
        &self.cooldown
    }

    pub fn cooldown_state(&self, symbol: &str, now: DateTime<Utc>) -> CooldownState {
        self.cooldown.state(symbol, now)
    }

    /// Annotate both sequences and evaluate them.
    ///
    /// Short histories, neutral trends and instruments in cooldown are
    /// `Ok(None)`; only malformed candles are errors.
    pub fn evaluate(
        &self,
        slow: &[Candle],
        fast: &[Candle],
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Signal>, IndicatorError> {
        let slow = self.indicators.compute(slow)?;
        let fast = self.indicators.compute(fast)?;
        Ok(self.evaluate_annotated(&slow, &fast, symbol, now))
    }

    /// Evaluate already annotated sequences. While the instrument is cooling
    /// down nothing is evaluated, ready alerts included.
    pub fn evaluate_annotated(
        &self,
        slow: &[AnnotatedCandle],
        fast: &[AnnotatedCandle],
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Option<Signal> {
        if self.cooldown.is_cooling_down(symbol, now) {
            debug!(symbol = %symbol, "instrument cooling down, skipping evaluation");
            return None;
        }

        let trend = classify_trend(slow);
        if !trend.is_actionable() {
            debug!(symbol = %symbol, bias = %trend.bias, valid = trend.valid, "no actionable trend");
            return None;
        }

        let decision = self.evaluator.evaluate(fast, trend.bias)?;

        // Re-checked under the lock: a concurrent call may have recorded an
        // entry since the gate above.
        if decision.kind.is_entry() && !self.cooldown.try_record_entry(symbol, now) {
            debug!(
                symbol = %symbol,
                kind = %decision.kind,
                "entry suppressed, instrument cooling down"
            );
            return None;
        }

        Some(Signal::new(
            symbol.to_string(),
            decision.kind,
            decision.price,
            decision.rationale,
            decision.levels,
            now,
        ))
    }

    /// Trend reading for a raw slow-timeframe sequence.
    pub fn trend(&self, slow: &[Candle]) -> Result<TrendReading, IndicatorError> {
        Ok(classify_trend(&self.indicators.compute(slow)?))
    }
}
