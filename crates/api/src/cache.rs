use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use common::{Bar, BarProvider, Result};

type CacheKey = (String, NaiveDate, NaiveDate);

struct CachedBars {
    fetched_at: Instant,
    bars: Arc<Vec<Bar>>,
}

/// Time-bounded cache of fetched bar series, keyed by ticker and range.
/// A zero TTL disables caching.
#[derive(Clone)]
pub struct BarCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<CacheKey, CachedBars>>>,
}

impl BarCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Return cached bars for the key, or fetch them from `provider`.
    /// Provider errors are never cached.
    pub async fn get_or_fetch(
        &self,
        provider: &dyn BarProvider,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Arc<Vec<Bar>>> {
        let key = (ticker.to_string(), start, end);

        if let Some(entry) = self.entries.read().await.get(&key) {
            if entry.fetched_at.elapsed() < self.ttl {
                debug!(%ticker, %start, %end, "Bar cache hit");
                return Ok(entry.bars.clone());
            }
        }

        let bars = Arc::new(provider.daily_bars(ticker, start, end).await?);

        if !self.ttl.is_zero() {
            let mut entries = self.entries.write().await;
            entries.retain(|_, e| e.fetched_at.elapsed() < self.ttl);
            entries.insert(
                key,
                CachedBars {
                    fetched_at: Instant::now(),
                    bars: bars.clone(),
                },
            );
        }

        Ok(bars)
    }

    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }
}
