//! Unit tests for the trade ledger

use crate::support::ts;
use pulsefx::ledger::{calculate_profit, LedgerError, PerformanceTracker, TradeStatus};
use pulsefx::models::signal::{Signal, SignalDirection, SignalKind, TradeLevels};
use tempfile::TempDir;

fn entry(kind: SignalKind, price: f64) -> Signal {
    let levels = TradeLevels::from_offsets(kind.direction(), price, 0.0010, 0.0020);
    Signal::new(
        "EUR/USD".to_string(),
        kind,
        price,
        "test".to_string(),
        Some(levels),
        ts(0),
    )
}

#[test]
fn profit_is_pips_times_lot_value() {
    // 20 pips at $1/pip
    assert_eq!(calculate_profit(1.1000, 1.1020, SignalDirection::Buy), 20.0);
    assert_eq!(calculate_profit(1.1000, 1.0990, SignalDirection::Buy), -10.0);
    assert_eq!(calculate_profit(1.1000, 1.0980, SignalDirection::Sell), 20.0);
    assert_eq!(calculate_profit(1.1000, 1.1010, SignalDirection::Sell), -10.0);
}

#[test]
fn new_ledger_starts_at_initial_balance() {
    let dir = TempDir::new().unwrap();
    let ledger = PerformanceTracker::open(dir.path().join("trades.json"), 500.0).unwrap();
    assert_eq!(ledger.current_balance(), 500.0);
    assert_eq!(ledger.initial_balance(), 500.0);
    assert!(ledger.trades().is_empty());
}

#[test]
fn only_entry_signals_open_trades() {
    let dir = TempDir::new().unwrap();
    let mut ledger = PerformanceTracker::open(dir.path().join("trades.json"), 1000.0).unwrap();

    let ready = Signal::new(
        "EUR/USD".to_string(),
        SignalKind::ReadyBuy,
        1.1,
        "ready".to_string(),
        None,
        ts(0),
    );
    assert!(ledger.record_entry(&ready).unwrap().is_none());

    let trade = ledger
        .record_entry(&entry(SignalKind::EntryBuy, 1.1000))
        .unwrap()
        .expect("trade opened");
    assert_eq!(trade.id, 1);
    assert_eq!(trade.status, TradeStatus::Open);
    assert_eq!(trade.profit_if_tp, 20.0);
    assert_eq!(trade.loss_if_sl, -10.0);

    let second = ledger
        .record_entry(&entry(SignalKind::EntrySell, 1.2000))
        .unwrap()
        .unwrap();
    assert_eq!(second.id, 2);
    assert_eq!(second.direction, SignalDirection::Sell);
    assert_eq!(ledger.open_trades().len(), 2);
}

#[test]
fn closing_updates_balance_and_daily_stats() {
    let dir = TempDir::new().unwrap();
    let mut ledger = PerformanceTracker::open(dir.path().join("trades.json"), 1000.0).unwrap();
    let a = ledger.record_entry(&entry(SignalKind::EntryBuy, 1.1000)).unwrap().unwrap();
    let b = ledger.record_entry(&entry(SignalKind::EntrySell, 1.1000)).unwrap().unwrap();

    let closed = ledger.close_trade(a.id, 1.1020, ts(30)).unwrap().unwrap();
    assert_eq!(closed.actual_profit, Some(20.0));
    assert_eq!(closed.exit_time, Some(ts(30)));
    ledger.close_trade(b.id, 1.1010, ts(45)).unwrap().unwrap();

    // Closing twice or closing an unknown id does nothing.
    assert!(ledger.close_trade(a.id, 1.2, ts(50)).unwrap().is_none());
    assert!(ledger.close_trade(99, 1.2, ts(50)).unwrap().is_none());

    assert_eq!(ledger.current_balance(), 1010.0);
    let day = ts(0).date_naive();
    assert_eq!(ledger.closed_trades_on(day).len(), 2);
    assert!(ledger.open_trades().is_empty());

    let summary = ledger.daily_summary(day);
    assert_eq!(summary.stats.total_trades, 2);
    assert_eq!(summary.stats.winning_trades, 1);
    assert_eq!(summary.stats.losing_trades, 1);
    assert_eq!(summary.stats.total_profit, 10.0);
    assert_eq!(summary.stats.win_rate, 50.0);
    assert_eq!(summary.total_profit_loss, 10.0);
    assert!((summary.roi - 1.0).abs() < 1e-12);

    let report = ledger.format_daily_report(day);
    assert!(report.contains("Date: 2024-03-04"));
    assert!(report.contains("Current balance: $1010.00"));
    assert!(report.contains("Win rate: 50.0%"));
}

#[test]
fn empty_day_summary_uses_zero_stats() {
    let dir = TempDir::new().unwrap();
    let ledger = PerformanceTracker::open(dir.path().join("trades.json"), 1000.0).unwrap();
    let summary = ledger.daily_summary(ts(0).date_naive());
    assert_eq!(summary.stats.total_trades, 0);
    assert_eq!(summary.roi, 0.0);
}

#[test]
fn ledger_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trades.json");
    {
        let mut ledger = PerformanceTracker::open(&path, 1000.0).unwrap();
        let t = ledger.record_entry(&entry(SignalKind::EntryBuy, 1.1000)).unwrap().unwrap();
        ledger.close_trade(t.id, 1.0990, ts(10)).unwrap();
        ledger.record_entry(&entry(SignalKind::EntrySell, 1.3000)).unwrap();
    }

    let reopened = PerformanceTracker::open(&path, 1000.0).unwrap();
    assert_eq!(reopened.trades().len(), 2);
    assert_eq!(reopened.current_balance(), 990.0);
    assert_eq!(reopened.open_trades().len(), 1);
    assert_eq!(reopened.trade(1).unwrap().status, TradeStatus::Closed);
    assert_eq!(reopened.daily_summary(ts(0).date_naive()).stats.losing_trades, 1);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["trades"][0]["status"], "closed");
    assert_eq!(raw["trades"][1]["direction"], "SELL");
    assert!(raw["daily_stats"]["2024-03-04"].is_object());
}

#[test]
fn corrupt_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trades.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        PerformanceTracker::open(&path, 1000.0),
        Err(LedgerError::Json { .. })
    ));
}

#[test]
fn failed_save_leaves_ledger_unchanged() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    let path = data_dir.join("trades.json");

    // Parent directory missing: the write fails.
    let mut ledger = PerformanceTracker::open(&path, 1000.0).unwrap();
    assert!(matches!(
        ledger.record_entry(&entry(SignalKind::EntryBuy, 1.1000)),
        Err(LedgerError::Io { .. })
    ));
    assert!(ledger.trades().is_empty());

    std::fs::create_dir(&data_dir).unwrap();
    let trade = ledger
        .record_entry(&entry(SignalKind::EntryBuy, 1.1000))
        .unwrap()
        .unwrap();
    assert_eq!(trade.id, 1);

    std::fs::remove_dir_all(&data_dir).unwrap();
    assert!(matches!(
        ledger.close_trade(trade.id, 1.1020, ts(30)),
        Err(LedgerError::Io { .. })
    ));
    assert_eq!(ledger.trade(1).unwrap().status, TradeStatus::Open);
    assert_eq!(ledger.current_balance(), 1000.0);
    assert_eq!(ledger.daily_summary(ts(30).date_naive()).stats.total_trades, 0);

    // Once the directory is back the same close goes through.
    std::fs::create_dir(&data_dir).unwrap();
    let closed = ledger.close_trade(trade.id, 1.1020, ts(30)).unwrap().unwrap();
    assert_eq!(closed.actual_profit, Some(20.0));
    assert_eq!(ledger.current_balance(), 1020.0);
}
