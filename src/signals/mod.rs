//! Signal evaluation: trend classification, entry rules and cooldown.

pub mod cooldown;
pub mod engine;
pub mod entry;
pub mod trend;

pub use cooldown::{CooldownState, CooldownTracker};
pub use engine::SignalEngine;
pub use entry::{EntryDecision, EntryRuleEvaluator, RuleChecks};
pub use trend::{bias_from_snapshot, classify_trend, TrendBias, TrendReading};
