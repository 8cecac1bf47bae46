//! Twelve Data REST provider.

use crate::config::TwelveDataConfig;
use crate::models::indicators::Candle;
use crate::models::timeframe::Timeframe;
use crate::services::market_data::{MarketDataError, MarketDataProvider};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Largest `outputsize` the time_series endpoint accepts.
pub const MAX_OUTPUT_SIZE: usize = 5000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    values: Option<Vec<TimeSeriesRow>>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesRow {
    datetime: String,
    open: String,
    high: String,
    low: String,
    close: String,
    #[serde(default)]
    volume: Option<String>,
}

impl TimeSeriesRow {
    fn to_candle(&self) -> Result<Candle, String> {
        let field = |name: &str, raw: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|e| format!("{}='{}': {}", name, raw, e))
        };
        let volume = match self.volume.as_deref() {
            Some(raw) => field("volume", raw)?,
            None => 0.0,
        };
        Ok(Candle::new(
            field("open", &self.open)?,
            field("high", &self.high)?,
            field("low", &self.low)?,
            field("close", &self.close)?,
            volume,
            parse_datetime(&self.datetime)?,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    price: Option<String>,
}

/// Provider timestamps are UTC; daily bars carry only a date.
fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
        .map_err(|e| format!("datetime='{}': {}", raw, e))
}

/// `EURUSD` becomes `EUR/USD`; anything else passes through.
pub fn format_symbol(symbol: &str) -> String {
    let symbol = symbol.trim();
    if symbol.len() == 6 && symbol.chars().all(|c| c.is_ascii_alphabetic()) {
        format!("{}/{}", &symbol[..3], &symbol[3..])
    } else {
        symbol.to_string()
    }
}

fn provider_error(status: Option<&str>, message: Option<String>) -> Option<MarketDataError> {
    if status == Some("error") {
        Some(MarketDataError::Provider(
            message.unwrap_or_else(|| "unknown error".to_string()),
        ))
    } else {
        None
    }
}

pub struct TwelveDataProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TwelveDataProvider {
    pub fn new(config: &TwelveDataConfig) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MarketDataProvider for TwelveDataProvider {
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let pair = format_symbol(symbol);
        let outputsize = limit.min(MAX_OUTPUT_SIZE).to_string();
        let url = format!("{}/time_series", self.base_url);

        debug!(symbol = %pair, interval = timeframe.provider_interval(), limit, "fetching candles");

        let response: TimeSeriesResponse = self
            .client
            .get(&url)
            .query(&[
                ("symbol", pair.as_str()),
                ("interval", timeframe.provider_interval()),
                ("outputsize", outputsize.as_str()),
                ("apikey", self.api_key.as_str()),
                ("format", "JSON"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = provider_error(response.status.as_deref(), response.message) {
            return Err(err);
        }

        let rows = response
            .values
            .filter(|rows| !rows.is_empty())
            .ok_or_else(|| MarketDataError::Empty(pair.clone()))?;

        let mut candles: Vec<Candle> = rows
            .iter()
            .filter_map(|row| match row.to_candle() {
                Ok(candle) => Some(candle),
                Err(reason) => {
                    warn!(symbol = %pair, reason = %reason, "skipping unparsable candle row");
                    None
                }
            })
            .collect();

        if candles.is_empty() {
            return Err(MarketDataError::Malformed(format!(
                "no parsable candles for {}",
                pair
            )));
        }

        candles.sort_by_key(|c| c.timestamp);
        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }
        Ok(candles)
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64, MarketDataError> {
        let pair = format_symbol(symbol);
        let url = format!("{}/price", self.base_url);

        let response: PriceResponse = self
            .client
            .get(&url)
            .query(&[("symbol", pair.as_str()), ("apikey", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = provider_error(response.status.as_deref(), response.message) {
            return Err(err);
        }

        let raw = response.price.ok_or_else(|| MarketDataError::Empty(pair.clone()))?;
        raw.trim()
            .parse::<f64>()
            .map_err(|e| MarketDataError::Malformed(format!("price '{}': {}", raw, e)))
    }
}
