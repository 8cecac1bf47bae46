//! Market data provider interface.

use crate::models::indicators::Candle;
use crate::models::timeframe::Timeframe;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("no data returned for {0}")]
    Empty(String),
}

impl MarketDataError {
    /// Transport failures are worth retrying; provider-reported errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            MarketDataError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
            }
            _ => false,
        }
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Historical candles in ascending time order, at most `limit` of them.
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError>;

    /// Get the latest price for a symbol
    async fn get_latest_price(&self, symbol: &str) -> Result<f64, MarketDataError>;
}
