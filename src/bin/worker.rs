//! PulseFX worker
//!
//! Polls market data on a fixed interval, evaluates every configured
//! instrument and delivers signals until interrupted.

use dotenvy::dotenv;
use pulsefx::config::Config;
use pulsefx::core::runtime::SignalRuntime;
use pulsefx::core::scheduler::CycleScheduler;
use pulsefx::ledger::PerformanceTracker;
use pulsefx::logging;
use pulsefx::services::notifier::{LogNotifier, Notifier};
use pulsefx::services::telegram::TelegramNotifier;
use pulsefx::services::twelve_data::TwelveDataProvider;
use pulsefx::signals::engine::SignalEngine;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = Config::from_env()?;
    info!(environment = %config.environment, "Starting PulseFX worker");
    info!(
        symbols = ?config.runtime.symbols,
        trend = %config.strategy.trend_timeframe,
        entry = %config.strategy.entry_timeframe,
        interval = config.runtime.evaluation_interval_seconds,
        time_filter = config.sessions.enabled,
        "Configuration loaded"
    );

    let provider = Arc::new(TwelveDataProvider::new(&config.twelve_data)?);

    let notifier: Arc<dyn Notifier> = match &config.telegram {
        Some(telegram) => Arc::new(TelegramNotifier::new(telegram)?),
        None => {
            warn!("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set, notifications go to the log only");
            Arc::new(LogNotifier)
        }
    };

    let ledger = PerformanceTracker::open(&config.ledger.path, config.ledger.initial_balance)?;
    info!(
        path = %config.ledger.path.display(),
        balance = ledger.current_balance(),
        open_trades = ledger.open_trades().len(),
        "Ledger ready"
    );

    let engine = Arc::new(SignalEngine::new(config.strategy.clone())?);
    let scheduler = CycleScheduler::new(config.runtime.evaluation_interval_seconds)?;

    let runtime = SignalRuntime::new(
        config.runtime.clone(),
        provider,
        notifier,
        engine,
        config.sessions.clone(),
    )
    .with_ledger(Arc::new(Mutex::new(ledger)));

    info!("Worker running (Ctrl-C to stop)");
    runtime.run(&scheduler).await;
    info!("Worker stopped");

    Ok(())
}
