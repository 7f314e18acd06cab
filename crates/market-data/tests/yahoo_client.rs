use std::time::Duration;

use chrono::NaiveDate;
use common::{BarProvider, Error};
use market_data::YahooClient;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn client(server: &MockServer) -> YahooClient {
    YahooClient::new(server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn fetches_and_cleans_daily_bars() {
    let server = MockServer::start().await;
    // 2024-01-02, 2024-01-03, 2024-01-04 at 09:30 New York, last close missing
    let body = json!({
        "chart": {
            "result": [{
                "meta": {"symbol": "NVDA", "gmtoffset": -18000},
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {"quote": [{
                    "open":   [49.2, 47.5, 47.8],
                    "high":   [49.3, 48.2, 48.5],
                    "low":    [47.6, 47.3, 47.5],
                    "close":  [48.1, 47.6, null],
                    "volume": [411254000, 320896000, 306535000]
                }]}
            }],
            "error": null
        }
    });

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NVDA"))
        .and(query_param("interval", "1d"))
        .and(query_param("period1", "1704153600"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let bars = client(&server)
        .daily_bars("NVDA", date(2024, 1, 2), date(2024, 1, 4))
        .await
        .unwrap();

    assert_eq!(bars.len(), 3);
    assert_eq!(bars[0].date, date(2024, 1, 2));
    assert_eq!(bars[0].volume, 411_254_000);
    assert_eq!(bars[2].date, date(2024, 1, 4));
    assert_eq!(bars[2].close, 47.6, "missing close is forward-filled");
}

#[tokio::test]
async fn unknown_symbol_is_a_provider_error() {
    let server = MockServer::start().await;
    let body = json!({
        "chart": {
            "result": null,
            "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
        }
    });

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/ZZZZ"))
        .respond_with(ResponseTemplate::new(404).set_body_json(body))
        .mount(&server)
        .await;

    let err = client(&server)
        .daily_bars("ZZZZ", date(2024, 1, 2), date(2024, 2, 2))
        .await
        .unwrap_err();

    match err {
        Error::DataProvider(msg) => assert!(msg.contains("delisted"), "message was: {msg}"),
        other => panic!("expected DataProvider error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_result_is_a_provider_error() {
    let server = MockServer::start().await;
    let body = json!({
        "chart": {
            "result": [{
                "meta": {"gmtoffset": 0},
                "indicators": {"quote": [{}]}
            }],
            "error": null
        }
    });

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/EMPTY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let err = client(&server)
        .daily_bars("EMPTY", date(2024, 1, 2), date(2024, 2, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DataProvider(_)));
}

#[tokio::test]
async fn server_error_without_chart_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client(&server)
        .daily_bars("NVDA", date(2024, 1, 2), date(2024, 2, 2))
        .await
        .unwrap_err();

    match err {
        Error::DataProvider(msg) => assert!(msg.contains("503")),
        other => panic!("expected DataProvider error, got {other:?}"),
    }
}
