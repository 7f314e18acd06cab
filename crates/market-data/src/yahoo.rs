use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use common::{Bar, BarProvider, Error, Result};

use crate::clean::{clean_bars, RawBar};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; breakout-scanner/0.1)";

/// Daily history client for the Yahoo Finance chart API.
pub struct YahooClient {
    base_url: String,
    http: Client,
}

impl YahooClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Raw chart rows for `start..=end`, before cleaning.
    async fn chart_rows(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawBar>> {
        let url = format!("{}/v8/finance/chart/{ticker}", self.base_url);
        let period1 = unix_midnight(start);
        let period2 = unix_midnight(end.succ_opt().unwrap_or(end));

        debug!(%ticker, %start, %end, "Requesting daily chart");
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        // Yahoo reports unknown symbols as a 404 with a chart error payload.
        let chart: ChartEnvelope = match serde_json::from_str(&body) {
            Ok(chart) => chart,
            Err(_) if !status.is_success() => {
                return Err(Error::DataProvider(format!("HTTP {status}: {body}")));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(err) = chart.chart.error {
            return Err(Error::DataProvider(format!(
                "{ticker}: {} ({})",
                err.description, err.code
            )));
        }
        if !status.is_success() {
            return Err(Error::DataProvider(format!("HTTP {status}: {body}")));
        }

        let result = chart
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| Error::DataProvider(format!("No data received for {ticker}")))?;

        result.into_rows()
    }
}

#[async_trait]
impl BarProvider for YahooClient {
    async fn daily_bars(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>> {
        let rows = self.chart_rows(ticker, start, end).await?;
        let raw_count = rows.len();

        let bars: Vec<Bar> = clean_bars(rows)
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();

        if bars.is_empty() {
            warn!(%ticker, %start, %end, "Chart returned no usable bars");
            return Err(Error::DataProvider(format!("No data received for {ticker}")));
        }

        debug!(%ticker, raw = raw_count, bars = bars.len(), "Daily bars fetched");
        Ok(bars)
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Deserialize, Default)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds; timestamps are session opens.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Default)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl ChartResult {
    fn into_rows(self) -> Result<Vec<RawBar>> {
        let offset = self.meta.gmtoffset;
        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();
        let at = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

        self.timestamp
            .iter()
            .enumerate()
            .map(|(i, &ts)| -> Result<RawBar> {
                let date = ts
                    .checked_add(offset)
                    .and_then(|local| DateTime::from_timestamp(local, 0))
                    .ok_or_else(|| Error::DataProvider(format!("Invalid timestamp {ts}")))?
                    .date_naive();
                Ok(RawBar {
                    date,
                    open: at(&quote.open, i),
                    high: at(&quote.high, i),
                    low: at(&quote.low, i),
                    close: at(&quote.close, i),
                    volume: at(&quote.volume, i),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_open_maps_to_exchange_date() {
        // 2024-01-02 09:30 EST is 14:30 UTC; offset keeps it on the same day.
        let json = r#"{
            "meta": {"gmtoffset": -18000},
            "timestamp": [1704205800],
            "indicators": {"quote": [{
                "open": [10.0], "high": [11.0], "low": [9.5], "close": [10.5], "volume": [1000]
            }]}
        }"#;
        let result: ChartResult = serde_json::from_str(json).unwrap();
        let rows = result.into_rows().unwrap();
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(rows[0].close, Some(10.5));
        assert_eq!(rows[0].volume, Some(1000.0));
    }

    #[test]
    fn short_quote_arrays_yield_missing_fields() {
        let json = r#"{
            "meta": {},
            "timestamp": [1704205800, 1704292200],
            "indicators": {"quote": [{"close": [10.0, null], "volume": [5]}]}
        }"#;
        let result: ChartResult = serde_json::from_str(json).unwrap();
        let rows = result.into_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].close, None);
        assert_eq!(rows[1].volume, None);
        assert_eq!(rows[0].open, None);
    }

    #[test]
    fn overflowing_timestamp_is_rejected() {
        let json = r#"{
            "meta": {"gmtoffset": 3600},
            "timestamp": [9223372036854775807],
            "indicators": {"quote": [{"close": [10.0], "volume": [5]}]}
        }"#;
        let result: ChartResult = serde_json::from_str(json).unwrap();
        let err = result.into_rows().unwrap_err();
        assert!(matches!(err, Error::DataProvider(msg) if msg.contains("Invalid timestamp")));
    }

    #[test]
    fn midnight_is_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(unix_midnight(date), 1_704_153_600);
    }
}
