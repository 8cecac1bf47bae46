//! Configuration loaded from environment variables.
//!
//! Every option has a default except the market-data API key. Values are read
//! through a lookup function so tests can supply them without touching the
//! process environment.

use crate::core::runtime::RuntimeConfig;
use crate::core::session::{TradingSession, TradingSessions};
use crate::models::indicators::IndicatorPeriods;
use crate::models::timeframe::Timeframe;
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_TWELVE_DATA_URL: &str = "https://api.twelvedata.com";
pub const DEFAULT_TELEGRAM_URL: &str = "https://api.telegram.org";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("inconsistent configuration: {0}")]
    Inconsistent(String),
}

pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

/// Inclusive RSI band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiZone {
    pub low: f64,
    pub high: f64,
}

impl RsiZone {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

impl FromStr for RsiZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (low, high) = s
            .split_once(',')
            .ok_or_else(|| "expected 'low,high'".to_string())?;
        let low = low.trim().parse::<f64>().map_err(|e| e.to_string())?;
        let high = high.trim().parse::<f64>().map_err(|e| e.to_string())?;
        Ok(Self { low, high })
    }
}

/// Thresholds consumed by the indicator engine, entry rules and cooldown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub periods: IndicatorPeriods,
    /// Maximum |close - fast EMA| in price units.
    pub ema_proximity: f64,
    pub rsi_buy_zone: RsiZone,
    pub rsi_sell_zone: RsiZone,
    pub rsi_midline: f64,
    pub atr_min_value: f64,
    pub stop_loss_offset: f64,
    pub take_profit_offset: f64,
    /// Cooldown length in entry-timeframe candles.
    pub cooldown_candles: u32,
    pub enable_ready_alert: bool,
    pub trend_timeframe: Timeframe,
    pub entry_timeframe: Timeframe,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            periods: IndicatorPeriods::default(),
            ema_proximity: 0.0005,
            rsi_buy_zone: RsiZone::new(40.0, 50.0),
            rsi_sell_zone: RsiZone::new(50.0, 60.0),
            rsi_midline: 50.0,
            atr_min_value: 0.00005,
            stop_loss_offset: 0.0010,
            take_profit_offset: 0.0020,
            cooldown_candles: 5,
            enable_ready_alert: true,
            trend_timeframe: Timeframe::FiveMinutes,
            entry_timeframe: Timeframe::OneMinute,
        }
    }
}

impl StrategyConfig {
    pub fn cooldown_window(&self) -> Duration {
        Duration::minutes(self.entry_timeframe.minutes() * i64::from(self.cooldown_candles))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.periods;
        if p.ema_fast == 0 || p.ema_slow == 0 || p.rsi == 0 || p.atr == 0 {
            return Err(ConfigError::Inconsistent(
                "indicator periods must be at least 1".to_string(),
            ));
        }
        if p.ema_fast >= p.ema_slow {
            return Err(ConfigError::Inconsistent(format!(
                "EMA_FAST ({}) must be shorter than EMA_SLOW ({})",
                p.ema_fast, p.ema_slow
            )));
        }
        let zones = [
            ("RSI_BUY_ZONE", self.rsi_buy_zone),
            ("RSI_SELL_ZONE", self.rsi_sell_zone),
        ];
        for (name, zone) in zones {
            if zone.low > zone.high || zone.low < 0.0 || zone.high > 100.0 {
                return Err(ConfigError::Inconsistent(format!(
                    "{} must satisfy 0 <= low <= high <= 100, got {},{}",
                    name, zone.low, zone.high
                )));
            }
        }
        if !(0.0..=100.0).contains(&self.rsi_midline) {
            return Err(ConfigError::Inconsistent(format!(
                "RSI_MIDLINE must be within 0..=100, got {}",
                self.rsi_midline
            )));
        }
        let non_negative = [
            ("EMA_PROXIMITY", self.ema_proximity),
            ("ATR_MIN_VALUE", self.atr_min_value),
            ("STOP_LOSS_OFFSET", self.stop_loss_offset),
            ("TAKE_PROFIT_OFFSET", self.take_profit_offset),
        ];
        if let Some((name, value)) = non_negative.iter().find(|(_, v)| v.is_nan() || *v < 0.0) {
            return Err(ConfigError::Inconsistent(format!(
                "{} must be a non-negative number, got {}",
                name, value
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TwelveDataConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    pub path: PathBuf,
    pub initial_balance: f64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub strategy: StrategyConfig,
    pub runtime: RuntimeConfig,
    pub sessions: TradingSessions,
    pub twelve_data: TwelveDataConfig,
    pub telegram: Option<TelegramConfig>,
    pub ledger: LedgerConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup: &lookup };
        let defaults = StrategyConfig::default();

        let strategy = StrategyConfig {
            periods: IndicatorPeriods {
                ema_fast: vars.parse("EMA_FAST", defaults.periods.ema_fast)?,
                ema_slow: vars.parse("EMA_SLOW", defaults.periods.ema_slow)?,
                rsi: vars.parse("RSI_PERIOD", defaults.periods.rsi)?,
                atr: vars.parse("ATR_PERIOD", defaults.periods.atr)?,
            },
            ema_proximity: vars.parse("EMA_PROXIMITY", defaults.ema_proximity)?,
            rsi_buy_zone: vars.parse("RSI_BUY_ZONE", defaults.rsi_buy_zone)?,
            rsi_sell_zone: vars.parse("RSI_SELL_ZONE", defaults.rsi_sell_zone)?,
            rsi_midline: vars.parse("RSI_MIDLINE", defaults.rsi_midline)?,
            atr_min_value: vars.parse("ATR_MIN_VALUE", defaults.atr_min_value)?,
            stop_loss_offset: vars.parse("STOP_LOSS_OFFSET", defaults.stop_loss_offset)?,
            take_profit_offset: vars.parse("TAKE_PROFIT_OFFSET", defaults.take_profit_offset)?,
            cooldown_candles: vars.parse("SIGNAL_COOLDOWN_CANDLES", defaults.cooldown_candles)?,
            enable_ready_alert: vars.flag("ENABLE_READY_ALERT", defaults.enable_ready_alert)?,
            trend_timeframe: vars.parse("TREND_TIMEFRAME", defaults.trend_timeframe)?,
            entry_timeframe: vars.parse("ENTRY_TIMEFRAME", defaults.entry_timeframe)?,
        };
        strategy.validate()?;

        let runtime_defaults = RuntimeConfig::default();
        let symbols = match vars.get("TRADING_PAIRS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => runtime_defaults.symbols.clone(),
        };
        if symbols.is_empty() {
            return Err(ConfigError::Inconsistent(
                "TRADING_PAIRS must name at least one instrument".to_string(),
            ));
        }
        let runtime = RuntimeConfig {
            symbols,
            candles_limit: vars.parse("CANDLES_LIMIT", runtime_defaults.candles_limit)?,
            evaluation_interval_seconds: vars.parse(
                "UPDATE_INTERVAL_SECONDS",
                runtime_defaults.evaluation_interval_seconds,
            )?,
            fetch_retries: vars.parse("FETCH_RETRIES", runtime_defaults.fetch_retries)?,
            ..runtime_defaults
        };
        if runtime.evaluation_interval_seconds == 0 {
            return Err(ConfigError::Inconsistent(
                "UPDATE_INTERVAL_SECONDS must be > 0".to_string(),
            ));
        }

        let session_defaults = TradingSessions::default();
        let sessions = TradingSessions::new(
            vars.flag("ENABLE_TIME_FILTER", session_defaults.enabled)?,
            vec![
                vars.session("LONDON_SESSION", "London", &session_defaults.sessions[0])?,
                vars.session("NY_SESSION", "New York", &session_defaults.sessions[1])?,
            ],
        );

        let twelve_data = TwelveDataConfig {
            api_key: vars
                .get("TWELVE_DATA_API_KEY")
                .ok_or(ConfigError::Missing("TWELVE_DATA_API_KEY"))?,
            base_url: vars
                .get("TWELVE_DATA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TWELVE_DATA_URL.to_string()),
        };

        let telegram = match (vars.get("TELEGRAM_BOT_TOKEN"), vars.get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                bot_token,
                chat_id,
                base_url: vars
                    .get("TELEGRAM_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_URL.to_string()),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Inconsistent(
                    "TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set together".to_string(),
                ))
            }
        };

        let ledger = LedgerConfig {
            path: vars
                .get("LEDGER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("trades_history.json")),
            initial_balance: vars.parse("INITIAL_BALANCE", 1000.0)?,
        };

        Ok(Self {
            environment: vars.get("APP_ENV").unwrap_or_else(|| "sandbox".to_string()),
            strategy,
            runtime,
            sessions,
            twelve_data,
            telegram,
            ledger,
        })
    }
}

struct Vars<'a, F> {
    lookup: &'a F,
}

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn flag(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::Invalid {
                    key,
                    value: raw,
                    reason: "expected a boolean".to_string(),
                }),
            },
        }
    }

    fn session(
        &self,
        key: &'static str,
        name: &str,
        default: &TradingSession,
    ) -> Result<TradingSession, ConfigError> {
        let Some(raw) = self.get(key) else {
            return Ok(default.clone());
        };
        let invalid = |reason: String| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason,
        };
        let (start, end) = raw
            .split_once('-')
            .ok_or_else(|| invalid("expected 'HH:MM-HH:MM'".to_string()))?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M")
            .map_err(|e| invalid(e.to_string()))?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M")
            .map_err(|e| invalid(e.to_string()))?;
        Ok(TradingSession::new(name, start, end))
    }
}
