use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{Bar, Result};

/// Abstraction over the historical price source.
///
/// `YahooClient` in `crates/market-data` implements this for live data.
/// Tests plug in in-memory series.
///
/// Implementations return cleaned bars: ascending by date, one bar per
/// trading day, no duplicate dates.
#[async_trait]
pub trait BarProvider: Send + Sync {
    /// Fetch daily bars for `ticker` covering `start..=end`.
    async fn daily_bars(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>>;
}
