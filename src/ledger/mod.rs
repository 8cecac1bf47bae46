//! JSON-backed trade ledger and daily performance statistics.
//!
//! Entry signals open paper trades at the signal price with the signal's
//! stop-loss and take-profit. Trades are closed explicitly with an exit price;
//! the realised profit moves the balance and the statistics of the exit day.
//! Every mutation is written to disk before it becomes visible in memory; a
//! failed write leaves the tracker unchanged.

use crate::models::signal::{Signal, SignalDirection};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Price delta to pips for four-decimal quotes.
pub const PIPS_PER_UNIT: f64 = 10_000.0;
/// Account currency per pip at a 0.01 lot.
pub const PIP_VALUE: f64 = 1.0;
pub const LOT_SIZE: f64 = 0.01;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: u64,
    pub symbol: String,
    pub direction: SignalDirection,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub entry_time: DateTime<Utc>,
    pub status: TradeStatus,
    pub profit_if_tp: f64,
    pub loss_if_sl: f64,
    pub actual_profit: Option<f64>,
    pub exit_price: Option<f64>,
    pub exit_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    pub total_profit: f64,
    pub win_rate: f64,
}

impl DailyStats {
    fn record(&mut self, profit: f64) {
        self.total_trades += 1;
        self.total_profit = round_cents(self.total_profit + profit);
        // Break-even trades count as losers.
        if profit > 0.0 {
            self.winning_trades += 1;
        } else {
            self.losing_trades += 1;
        }
        self.win_rate = f64::from(self.winning_trades) / f64::from(self.total_trades) * 100.0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub stats: DailyStats,
    pub current_balance: f64,
    pub initial_balance: f64,
    pub total_profit_loss: f64,
    pub roi: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    trades: Vec<Trade>,
    #[serde(default)]
    current_balance: Option<f64>,
    #[serde(default)]
    daily_stats: BTreeMap<String, DailyStats>,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Profit of moving from `entry` to `exit` in `direction`, rounded to cents.
pub fn calculate_profit(entry: f64, exit: f64, direction: SignalDirection) -> f64 {
    let delta = match direction {
        SignalDirection::Buy => exit - entry,
        SignalDirection::Sell => entry - exit,
    };
    round_cents(delta * PIPS_PER_UNIT * PIP_VALUE * LOT_SIZE * 100.0)
}

pub struct PerformanceTracker {
    path: PathBuf,
    initial_balance: f64,
    current_balance: f64,
    trades: Vec<Trade>,
    daily_stats: BTreeMap<String, DailyStats>,
}

impl PerformanceTracker {
    /// Load the ledger at `path`, or start an empty one if the file does not exist.
    pub fn open(path: impl AsRef<Path>, initial_balance: f64) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let file = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| LedgerError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str::<LedgerFile>(&raw).map_err(|source| LedgerError::Json {
                path: path.clone(),
                source,
            })?
        } else {
            LedgerFile::default()
        };

        info!(
            path = %path.display(),
            trades = file.trades.len(),
            "ledger loaded"
        );

        Ok(Self {
            current_balance: file.current_balance.unwrap_or(initial_balance),
            trades: file.trades,
            daily_stats: file.daily_stats,
            initial_balance,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    pub fn current_balance(&self) -> f64 {
        self.current_balance
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn trade(&self, id: u64) -> Option<&Trade> {
        self.trades.iter().find(|t| t.id == id)
    }

    /// Open a trade for an entry signal. Ready signals and signals without
    /// levels are ignored.
    pub fn record_entry(&mut self, signal: &Signal) -> Result<Option<Trade>, LedgerError> {
        let Some(levels) = signal.levels.filter(|_| signal.is_entry()) else {
            return Ok(None);
        };

        let id = self.trades.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let trade = Trade {
            id,
            symbol: signal.symbol.clone(),
            direction: signal.direction,
            entry_price: signal.price,
            stop_loss: levels.stop_loss,
            take_profit: levels.take_profit,
            entry_time: signal.timestamp,
            status: TradeStatus::Open,
            profit_if_tp: calculate_profit(signal.price, levels.take_profit, signal.direction),
            loss_if_sl: calculate_profit(signal.price, levels.stop_loss, signal.direction),
            actual_profit: None,
            exit_price: None,
            exit_time: None,
        };
        let mut trades = self.trades.clone();
        trades.push(trade.clone());
        self.persist(&trades, self.current_balance, &self.daily_stats)?;
        self.trades = trades;

        debug!(id, symbol = %trade.symbol, direction = %trade.direction, "trade opened");
        Ok(Some(trade))
    }

    /// Close an open trade. Unknown or already closed ids yield `Ok(None)`.
    pub fn close_trade(
        &mut self,
        id: u64,
        exit_price: f64,
        at: DateTime<Utc>,
    ) -> Result<Option<Trade>, LedgerError> {
        let Some(index) = self
            .trades
            .iter()
            .position(|t| t.id == id && t.status == TradeStatus::Open)
        else {
            return Ok(None);
        };

        let mut closed = self.trades[index].clone();
        let profit = calculate_profit(closed.entry_price, exit_price, closed.direction);
        closed.status = TradeStatus::Closed;
        closed.exit_price = Some(exit_price);
        closed.exit_time = Some(at);
        closed.actual_profit = Some(profit);

        let mut trades = self.trades.clone();
        trades[index] = closed.clone();
        let balance = round_cents(self.current_balance + profit);
        let mut daily_stats = self.daily_stats.clone();
        daily_stats
            .entry(date_key(at.date_naive()))
            .or_default()
            .record(profit);

        self.persist(&trades, balance, &daily_stats)?;
        self.trades = trades;
        self.current_balance = balance;
        self.daily_stats = daily_stats;

        info!(id, symbol = %closed.symbol, profit, "trade closed");
        Ok(Some(closed))
    }

    pub fn open_trades(&self) -> Vec<&Trade> {
        self.trades
            .iter()
            .filter(|t| t.status == TradeStatus::Open)
            .collect()
    }

    pub fn closed_trades_on(&self, date: NaiveDate) -> Vec<&Trade> {
        self.trades
            .iter()
            .filter(|t| t.status == TradeStatus::Closed)
            .filter(|t| t.exit_time.is_some_and(|at| at.date_naive() == date))
            .collect()
    }

    pub fn daily_summary(&self, date: NaiveDate) -> DailySummary {
        let stats = self
            .daily_stats
            .get(&date_key(date))
            .cloned()
            .unwrap_or_default();
        let total_profit_loss = round_cents(self.current_balance - self.initial_balance);
        let roi = if self.initial_balance != 0.0 {
            total_profit_loss / self.initial_balance * 100.0
        } else {
            0.0
        };
        DailySummary {
            date,
            stats,
            current_balance: self.current_balance,
            initial_balance: self.initial_balance,
            total_profit_loss,
            roi,
        }
    }

    pub fn format_daily_report(&self, date: NaiveDate) -> String {
        let s = self.daily_summary(date);
        let rule = "━━━━━━━━━━━━━━━━━━━━";
        [
            rule.to_string(),
            "📊 <b>Daily performance report</b>".to_string(),
            format!("📅 Date: {}", s.date.format("%Y-%m-%d")),
            rule.to_string(),
            String::new(),
            "💰 <b>Balance</b>".to_string(),
            format!("• Current balance: ${:.2}", s.current_balance),
            format!("• Initial balance: ${:.2}", s.initial_balance),
            format!("• Total P/L: ${:.2}", s.total_profit_loss),
            format!("• ROI: {:.2}%", s.roi),
            String::new(),
            "📈 <b>Trades today</b>".to_string(),
            format!("• Total trades: {}", s.stats.total_trades),
            format!("• Winning trades: {} ✅", s.stats.winning_trades),
            format!("• Losing trades: {} ❌", s.stats.losing_trades),
            format!("• Win rate: {:.1}%", s.stats.win_rate),
            format!("• Daily profit: ${:.2}", s.stats.total_profit),
            rule.to_string(),
        ]
        .join("\n")
    }

    /// Write `trades`, `current_balance` and `daily_stats` to disk. Callers
    /// commit the same state in memory only once this succeeds.
    fn persist(
        &self,
        trades: &[Trade],
        current_balance: f64,
        daily_stats: &BTreeMap<String, DailyStats>,
    ) -> Result<(), LedgerError> {
        let file = LedgerFile {
            trades: trades.to_vec(),
            current_balance: Some(current_balance),
            daily_stats: daily_stats.clone(),
            last_updated: Some(Utc::now()),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| LedgerError::Json {
            path: self.path.clone(),
            source,
        })?;

        // Write beside the target and rename so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        let io = |source| LedgerError::Io {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp, json).map_err(io)?;
        fs::rename(&tmp, &self.path).map_err(io)
    }
}
