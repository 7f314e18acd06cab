use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use common::{Bar, BreakoutSignal, Error, FlaggedBar, Outcome, Result, ScanParams};

use crate::indicators::{pct_change, price_changes, volume_ratio, VolumeAverage};
use crate::summary::SignalSummary;

/// Per-bar indicator values, the series a chart overlays breakouts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarMetrics {
    #[serde(flatten)]
    pub bar: Bar,
    pub volume_ma: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub price_change_pct: Option<f64>,
    pub is_breakout: bool,
}

/// Everything a single scan produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub params: ScanParams,
    pub bars: Vec<BarMetrics>,
    /// All bars meeting the breakout condition, in date order.
    pub flagged: Vec<FlaggedBar>,
    /// Flagged bars whose holding period completed inside the series.
    pub signals: Vec<BreakoutSignal>,
    pub summary: SignalSummary,
}

impl ScanReport {
    /// Dates of every flagged bar.
    pub fn breakout_dates(&self) -> Vec<NaiveDate> {
        self.flagged.iter().map(|f| f.date).collect()
    }

    /// Flagged bars left out of `signals` because the series ended first.
    pub fn pending_count(&self) -> usize {
        self.flagged.iter().filter(|f| !f.finalized).count()
    }
}

/// Volume breakout scanner.
///
/// A bar is a breakout when its volume is at least `volume_ratio_threshold`
/// times the trailing `lookback`-bar average and its close rose at least
/// `price_change_threshold_pct` percent from the previous close. Each breakout
/// is held for `holding_period_days` bars and scored on the close-to-close
/// return.
///
/// Scanning is a pure function of the bars and parameters.
#[derive(Debug, Clone)]
pub struct BreakoutScanner {
    params: ScanParams,
}

impl BreakoutScanner {
    /// Fails with `InvalidParameters` on non-positive thresholds or periods.
    pub fn new(params: ScanParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    /// Scan `bars` (ascending by date).
    ///
    /// Fails with `InsufficientData` when fewer than `lookback + 1` bars are
    /// supplied. Finding no breakouts is not an error: the summary reports
    /// an empty signal set.
    pub fn scan(&self, bars: &[Bar]) -> Result<ScanReport> {
        let required = self.params.min_bars();
        if bars.len() < required {
            return Err(Error::InsufficientData {
                bars: bars.len(),
                required,
            });
        }

        let volumes: Vec<u64> = bars.iter().map(|b| b.volume).collect();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let averages = VolumeAverage::new(self.params.lookback).compute(&volumes);
        let changes = price_changes(&closes);

        let mut metrics = Vec::with_capacity(bars.len());
        let mut flagged = Vec::new();
        let mut signals = Vec::new();

        for (index, bar) in bars.iter().enumerate() {
            let volume_ma = averages[index];
            let ratio = volume_ma.and_then(|ma| volume_ratio(bar.volume, ma));
            let change = changes[index];
            let breakout = self.breakout(ratio, change);

            if let Some((ratio, change)) = breakout {
                // The forward return is undefined when the exit close is
                // missing or non-finite; such bars stay unfinalized.
                let exit = index
                    .checked_add(self.params.holding_period_days)
                    .and_then(|i| bars.get(i))
                    .and_then(|exit_bar| {
                        pct_change(bar.close, exit_bar.close).map(|ret| (exit_bar, ret))
                    });

                flagged.push(FlaggedBar {
                    index,
                    date: bar.date,
                    volume_ratio: ratio,
                    price_change_pct: change,
                    finalized: exit.is_some(),
                });

                match exit {
                    Some((exit_bar, forward_return_pct)) => {
                        signals.push(BreakoutSignal {
                            date: bar.date,
                            close: bar.close,
                            volume: bar.volume,
                            volume_ma: volume_ma.unwrap_or_default(),
                            volume_ratio: ratio,
                            price_change_pct: change,
                            entry_price: bar.close,
                            exit_date: exit_bar.date,
                            exit_price: exit_bar.close,
                            forward_return_pct,
                            outcome: Outcome::from_return(forward_return_pct),
                        });
                    }
                    None => {
                        debug!(date = %bar.date, index, "Breakout has no scorable exit bar");
                    }
                }
            }

            metrics.push(BarMetrics {
                bar: bar.clone(),
                volume_ma,
                volume_ratio: ratio,
                price_change_pct: change,
                is_breakout: breakout.is_some(),
            });
        }

        let summary = SignalSummary::from_signals(&signals, flagged.len());
        debug!(
            bars = bars.len(),
            flagged = flagged.len(),
            finalized = signals.len(),
            "Breakout scan complete"
        );

        Ok(ScanReport {
            params: self.params,
            bars: metrics,
            flagged,
            signals,
            summary,
        })
    }

    /// Both measures must be defined and meet their thresholds.
    fn breakout(&self, ratio: Option<f64>, change: Option<f64>) -> Option<(f64, f64)> {
        match (ratio, change) {
            (Some(ratio), Some(change))
                if ratio >= self.params.volume_ratio_threshold
                    && change >= self.params.price_change_threshold_pct =>
            {
                Some((ratio, change))
            }
            _ => None,
        }
    }
}

/// Validate `params` and scan `bars` in one call.
pub fn scan(bars: &[Bar], params: ScanParams) -> Result<ScanReport> {
    BreakoutScanner::new(params)?.scan(bars)
}
