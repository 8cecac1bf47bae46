//! Polling runtime: fetch, evaluate, notify and record on every cycle

use crate::core::scheduler::CycleScheduler;
use crate::core::session::TradingSessions;
use crate::indicators::IndicatorError;
use crate::ledger::PerformanceTracker;
use crate::models::indicators::Candle;
use crate::models::signal::Signal;
use crate::models::timeframe::Timeframe;
use crate::services::market_data::{MarketDataError, MarketDataProvider};
use crate::services::notifier::Notifier;
use crate::signals::engine::SignalEngine;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Configuration for the polling runtime
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub symbols: Vec<String>,
    pub candles_limit: usize,
    pub evaluation_interval_seconds: u64,
    /// Retries after the first failed fetch of a sequence.
    pub fetch_retries: usize,
    pub retry_delay: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["EUR/USD".to_string(), "GBP/USD".to_string()],
            candles_limit: 100,
            evaluation_interval_seconds: 60,
            fetch_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("market data for {timeframe}: {source}")]
    MarketData {
        timeframe: Timeframe,
        #[source]
        source: MarketDataError,
    },

    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

/// Outcome of one evaluation cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub skipped: bool,
    pub signals: Vec<Signal>,
    /// (symbol, error message) for instruments that could not be evaluated.
    pub failures: Vec<(String, String)>,
}

pub struct SignalRuntime {
    config: RuntimeConfig,
    provider: Arc<dyn MarketDataProvider>,
    notifier: Arc<dyn Notifier>,
    engine: Arc<SignalEngine>,
    sessions: TradingSessions,
    ledger: Option<Arc<Mutex<PerformanceTracker>>>,
}

impl SignalRuntime {
    pub fn new(
        config: RuntimeConfig,
        provider: Arc<dyn MarketDataProvider>,
        notifier: Arc<dyn Notifier>,
        engine: Arc<SignalEngine>,
        sessions: TradingSessions,
    ) -> Self {
        Self {
            config,
            provider,
            notifier,
            engine,
            sessions,
            ledger: None,
        }
    }

    pub fn with_ledger(mut self, ledger: Arc<Mutex<PerformanceTracker>>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<SignalEngine> {
        &self.engine
    }

    /// Run one cycle at `now`. Instruments are evaluated concurrently; a
    /// failing instrument is reported and does not affect the others.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> CycleReport {
        if !self.sessions.is_trading_time(now) {
            let next = self
                .sessions
                .next_session_start(now)
                .map(|(session, at)| format!("{} at {}", session.name, at.format("%H:%M UTC")));
            info!(next_session = ?next, "SignalRuntime: outside trading hours, skipping cycle");
            return CycleReport {
                skipped: true,
                ..CycleReport::default()
            };
        }

        info!(
            symbol_count = self.config.symbols.len(),
            session = %self.sessions.describe(now),
            "SignalRuntime: evaluating {} symbols",
            self.config.symbols.len()
        );

        let results = join_all(
            self.config
                .symbols
                .iter()
                .map(|symbol| self.evaluate_symbol(symbol, now)),
        )
        .await;

        let mut report = CycleReport::default();
        for (symbol, result) in self.config.symbols.iter().zip(results) {
            match result {
                Ok(Some(signal)) => {
                    self.deliver(&signal).await;
                    report.signals.push(signal);
                }
                Ok(None) => debug!(symbol = %symbol, "no signal"),
                Err(e) => {
                    error!(symbol = %symbol, error = %e, "SignalRuntime: evaluation failed");
                    let message = format!("{}: {}", symbol, e);
                    if let Err(notify_err) = self.notifier.send_error(&message, now).await {
                        warn!(error = %notify_err, "failed to deliver error notification");
                    }
                    report.failures.push((symbol.clone(), e.to_string()));
                }
            }
        }
        report
    }

    async fn evaluate_symbol(
        &self,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Signal>, EvaluationError> {
        let strategy = self.engine.config();
        let slow = self.fetch(symbol, strategy.trend_timeframe).await?;
        let fast = self.fetch(symbol, strategy.entry_timeframe).await?;
        Ok(self.engine.evaluate(&slow, &fast, symbol, now)?)
    }

    async fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>, EvaluationError> {
        let limit = self.config.candles_limit;
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.config.retry_delay)
            .with_max_times(self.config.fetch_retries);

        (|| self.provider.get_candles(symbol, timeframe, limit))
            .retry(backoff)
            .sleep(tokio::time::sleep)
            .when(|e: &MarketDataError| e.is_transient())
            .notify(|e: &MarketDataError, delay: Duration| {
                warn!(
                    symbol = %symbol,
                    timeframe = %timeframe,
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "candle fetch failed, retrying"
                );
            })
            .await
            .map_err(|source| EvaluationError::MarketData { timeframe, source })
    }

    async fn deliver(&self, signal: &Signal) {
        info!(
            symbol = %signal.symbol,
            kind = %signal.kind,
            price = signal.price,
            "SignalRuntime: signal emitted"
        );
        if let Err(e) = self.notifier.send_signal(signal).await {
            warn!(symbol = %signal.symbol, error = %e, "failed to deliver signal notification");
        }

        if !signal.is_entry() {
            return;
        }
        if let Some(ledger) = &self.ledger {
            if let Err(e) = ledger.lock().await.record_entry(signal) {
                warn!(symbol = %signal.symbol, error = %e, "failed to record trade");
            }
        }
    }

    /// Send the startup message, then run a cycle on every scheduler tick
    /// until Ctrl-C.
    pub async fn run(&self, scheduler: &CycleScheduler) {
        if let Err(e) = self
            .notifier
            .send_startup(&self.config.symbols, self.config.evaluation_interval_seconds, Utc::now())
            .await
        {
            warn!(error = %e, "failed to deliver startup notification");
        }
        info!(cron = %scheduler.expression(), "SignalRuntime: started");

        let mut cycle: u64 = 0;
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("SignalRuntime: shutdown requested");
                    break;
                }
                tick = scheduler.wait_next() => {
                    cycle += 1;
                    let report = self.run_cycle(tick).await;
                    info!(
                        cycle,
                        skipped = report.skipped,
                        signals = report.signals.len(),
                        failures = report.failures.len(),
                        "SignalRuntime: cycle complete"
                    );
                }
            }
        }

        let stopped = format!(
            "🛑 <b>Signal worker stopped</b>\n⏰ Time: {} UTC",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        );
        if let Err(e) = self.notifier.send_text(&stopped).await {
            warn!(error = %e, "failed to deliver shutdown notification");
        }
    }
}
