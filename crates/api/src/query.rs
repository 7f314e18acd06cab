use chrono::{Duration, NaiveDate};
use serde::Deserialize;

use common::{Error, Result, ScanParams};
use market_data::weekdays_between;
use strategy::ScanFileConfig;

/// Shortest analysis window accepted, in weekdays.
pub const MIN_ANALYSIS_WEEKDAYS: usize = 30;

const MAX_TICKER_LEN: usize = 12;

/// Query string of the scan endpoints. Omitted parameters use the configured
/// defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanQuery {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub volume_threshold: Option<f64>,
    pub price_threshold: Option<f64>,
    pub holding_period: Option<usize>,
}

/// A validated scan request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub params: ScanParams,
}

impl ScanQuery {
    /// Validate against the scan config and the current date.
    pub fn into_request(self, cfg: &ScanFileConfig, today: NaiveDate) -> Result<ScanRequest> {
        let ticker = normalize_ticker(&self.ticker)?;

        let params = ScanParams {
            volume_ratio_threshold: self
                .volume_threshold
                .unwrap_or(cfg.defaults.volume_ratio_threshold),
            price_change_threshold_pct: self
                .price_threshold
                .unwrap_or(cfg.defaults.price_change_threshold_pct),
            holding_period_days: self.holding_period.unwrap_or(cfg.defaults.holding_period_days),
            lookback: cfg.defaults.lookback,
        };
        cfg.check(&params)?;

        if self.end <= self.start {
            return Err(Error::InvalidRequest(
                "End date must be after start date".to_string(),
            ));
        }

        // Bounds every later date computation.
        if self.end > today {
            return Err(Error::InvalidRequest(
                "End date cannot be in the future".to_string(),
            ));
        }

        let after_end = weekdays_between(self.end + Duration::days(1), today);
        if after_end < params.holding_period_days {
            return Err(Error::InvalidRequest(format!(
                "End date must be at least {} trading days before today",
                params.holding_period_days
            )));
        }

        if weekdays_between(self.start, self.end) < MIN_ANALYSIS_WEEKDAYS {
            return Err(Error::InvalidRequest(format!(
                "Selected period too short (minimum {MIN_ANALYSIS_WEEKDAYS} trading days)"
            )));
        }

        Ok(ScanRequest {
            ticker,
            start: self.start,
            end: self.end,
            params,
        })
    }
}

/// Upper-case the symbol and reject anything that cannot be a listed ticker.
pub fn normalize_ticker(raw: &str) -> Result<String> {
    let ticker = raw.trim().to_ascii_uppercase();
    if ticker.is_empty() {
        return Err(Error::InvalidRequest("Please enter a ticker symbol".to_string()));
    }
    let valid_chars = ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
    if ticker.len() > MAX_TICKER_LEN || !valid_chars {
        return Err(Error::InvalidRequest(format!("Invalid ticker symbol '{}'", raw.trim())));
    }
    Ok(ticker)
}
