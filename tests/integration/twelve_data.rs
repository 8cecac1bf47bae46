//! Integration tests for the Twelve Data provider against a mock HTTP server.

use crate::test_utils::{bullish_slow_candles, time_series_body};
use pulsefx::config::TwelveDataConfig;
use pulsefx::models::timeframe::Timeframe;
use pulsefx::services::market_data::{MarketDataError, MarketDataProvider};
use pulsefx::services::twelve_data::TwelveDataProvider;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> TwelveDataProvider {
    TwelveDataProvider::new(&TwelveDataConfig {
        api_key: "test-key".to_string(),
        base_url: server.uri(),
    })
    .expect("client builds")
}

#[tokio::test]
async fn time_series_is_requested_with_provider_parameters() {
    let server = MockServer::start().await;
    let candles = bullish_slow_candles();

    Mock::given(method("GET"))
        .and(path("/time_series"))
        .and(query_param("symbol", "EUR/USD"))
        .and(query_param("interval", "5min"))
        .and(query_param("outputsize", "20"))
        .and(query_param("apikey", "test-key"))
        .and(query_param("format", "JSON"))
        .respond_with(ResponseTemplate::new(200).set_body_json(time_series_body("EUR/USD", &candles)))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = provider(&server)
        .get_candles("EURUSD", Timeframe::FiveMinutes, 20)
        .await
        .expect("candles");

    assert_eq!(fetched.len(), candles.len());
    assert!(fetched.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert_eq!(fetched[0].timestamp, candles[0].timestamp);
    assert!((fetched.last().unwrap().close - candles.last().unwrap().close).abs() < 1e-9);
}

#[tokio::test]
async fn unparsable_rows_are_skipped_and_output_truncated() {
    let server = MockServer::start().await;
    let body = json!({
        "values": [
            { "datetime": "2024-03-04 10:04:00", "open": "1.1004", "high": "1.1006", "low": "1.1002", "close": "1.1005" },
            { "datetime": "2024-03-04 10:03:00", "open": "1.1003", "high": "1.1005", "low": "1.1001", "close": "n/a" },
            { "datetime": "2024-03-04 10:02:00", "open": "1.1002", "high": "1.1004", "low": "1.1000", "close": "1.1003", "volume": "12" },
            { "datetime": "2024-03-04 10:01:00", "open": "1.1001", "high": "1.1003", "low": "1.0999", "close": "1.1002" },
            { "datetime": "2024-03-04 10:00:00", "open": "1.1000", "high": "1.1002", "low": "1.0998", "close": "1.1001" }
        ],
        "status": "ok"
    });
    Mock::given(method("GET"))
        .and(path("/time_series"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let candles = provider(&server)
        .get_candles("EUR/USD", Timeframe::OneMinute, 3)
        .await
        .expect("candles");

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    assert_eq!(closes, vec![1.1002, 1.1003, 1.1005]);
    assert_eq!(candles[1].volume, 12.0);
    assert_eq!(candles[0].volume, 0.0);
}

#[tokio::test]
async fn provider_error_status_carries_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/time_series"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 400,
            "message": "**symbol** not found: XXX/YYY",
            "status": "error"
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .get_candles("XXX/YYY", Timeframe::OneMinute, 10)
        .await
        .unwrap_err();
    match err {
        MarketDataError::Provider(message) => assert!(message.contains("not found")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_values_are_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/time_series"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "values": [], "status": "ok" })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .get_candles("EUR/USD", Timeframe::OneMinute, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Empty(ref s) if s == "EUR/USD"));
}

#[tokio::test]
async fn server_errors_are_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/time_series"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = provider(&server)
        .get_candles("EUR/USD", Timeframe::OneMinute, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Http(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn latest_price_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/price"))
        .and(query_param("symbol", "GBP/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "price": "1.26543" })))
        .mount(&server)
        .await;

    let price = provider(&server).get_latest_price("GBPUSD").await.expect("price");
    assert!((price - 1.26543).abs() < 1e-12);
}
