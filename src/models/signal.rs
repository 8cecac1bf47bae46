use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalDirection {
    Buy,
    Sell,
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalDirection::Buy => write!(f, "BUY"),
            SignalDirection::Sell => write!(f, "SELL"),
        }
    }
}

/// The four signal classes the engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    ReadyBuy,
    EntryBuy,
    ReadySell,
    EntrySell,
}

impl SignalKind {
    pub fn ready(direction: SignalDirection) -> Self {
        match direction {
            SignalDirection::Buy => SignalKind::ReadyBuy,
            SignalDirection::Sell => SignalKind::ReadySell,
        }
    }

    pub fn entry(direction: SignalDirection) -> Self {
        match direction {
            SignalDirection::Buy => SignalKind::EntryBuy,
            SignalDirection::Sell => SignalKind::EntrySell,
        }
    }

    pub fn direction(&self) -> SignalDirection {
        match self {
            SignalKind::ReadyBuy | SignalKind::EntryBuy => SignalDirection::Buy,
            SignalKind::ReadySell | SignalKind::EntrySell => SignalDirection::Sell,
        }
    }

    /// Entry kinds start a cooldown; ready kinds never do.
    pub fn is_entry(&self) -> bool {
        matches!(self, SignalKind::EntryBuy | SignalKind::EntrySell)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::ReadyBuy => "ready_buy",
            SignalKind::EntryBuy => "entry_buy",
            SignalKind::ReadySell => "ready_sell",
            SignalKind::EntrySell => "entry_sell",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informational stop-loss and take-profit prices attached to entry signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl TradeLevels {
    /// Fixed price-unit offsets around `price`, mirrored for sells.
    pub fn from_offsets(
        direction: SignalDirection,
        price: f64,
        stop_loss_offset: f64,
        take_profit_offset: f64,
    ) -> Self {
        match direction {
            SignalDirection::Buy => Self {
                stop_loss: price - stop_loss_offset,
                take_profit: price + take_profit_offset,
            },
            SignalDirection::Sell => Self {
                stop_loss: price + stop_loss_offset,
                take_profit: price - take_profit_offset,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub kind: SignalKind,
    pub direction: SignalDirection,
    pub price: f64,
    pub rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<TradeLevels>,
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    pub fn new(
        symbol: String,
        kind: SignalKind,
        price: f64,
        rationale: String,
        levels: Option<TradeLevels>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol,
            kind,
            direction: kind.direction(),
            price,
            rationale,
            levels,
            timestamp,
        }
    }

    pub fn is_entry(&self) -> bool {
        self.kind.is_entry()
    }
}
