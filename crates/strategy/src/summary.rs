use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use common::{BreakoutSignal, Outcome};

/// Aggregate outcome of a scan.
///
/// A scan without finalized signals is reported as `EmptySignalSet` rather
/// than as zeroed statistics, so "no data" never reads as a 0% win rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignalSummary {
    EmptySignalSet {
        /// Bars that met the condition but could not be finalized.
        flagged_count: usize,
    },
    Signals(SignalStats),
}

/// Statistics over the finalized signal set.
///
/// Return and price figures are percentages; `win_rate` is a fraction in
/// `0.0..=1.0`. Volume-ratio figures cover finalized signals only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalStats {
    pub signal_count: usize,
    pub flagged_count: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub average_return_pct: f64,
    pub average_volume_ratio: f64,

    // Risk
    /// Sample standard deviation; absent with a single signal.
    pub return_std_dev: Option<f64>,
    pub best_return_pct: f64,
    pub worst_return_pct: f64,
    pub average_win_pct: Option<f64>,
    pub average_loss_pct: Option<f64>,

    // Volume
    pub max_volume_ratio: f64,
    pub min_volume_ratio: f64,
    pub volume_ratio_std_dev: Option<f64>,

    // Price
    pub average_price_change_pct: f64,
    pub max_price_change_pct: f64,
    pub min_price_change_pct: f64,

    // Timing
    pub first_signal: NaiveDate,
    pub last_signal: NaiveDate,
    /// Calendar days from first to last signal.
    pub days_spanned: i64,
    /// Mean calendar-day gap between consecutive signals.
    pub average_days_between_signals: Option<f64>,
}

impl SignalSummary {
    /// Summarize `signals` (ascending by date). `flagged_count` counts every
    /// bar that met the breakout condition, finalized or not.
    pub fn from_signals(signals: &[BreakoutSignal], flagged_count: usize) -> Self {
        let (Some(first), Some(last)) = (signals.first(), signals.last()) else {
            return SignalSummary::EmptySignalSet { flagged_count };
        };

        let returns: Vec<f64> = signals.iter().map(|s| s.forward_return_pct).collect();
        let ratios: Vec<f64> = signals.iter().map(|s| s.volume_ratio).collect();
        let changes: Vec<f64> = signals.iter().map(|s| s.price_change_pct).collect();

        let win_returns = returns_with(signals, Outcome::Win);
        let loss_returns = returns_with(signals, Outcome::Loss);

        let gaps: Vec<f64> = signals
            .windows(2)
            .map(|w| (w[1].date - w[0].date).num_days() as f64)
            .collect();

        let signal_count = signals.len();
        let wins = win_returns.len();

        SignalSummary::Signals(SignalStats {
            signal_count,
            flagged_count,
            wins,
            losses: loss_returns.len(),
            win_rate: wins as f64 / signal_count as f64,
            average_return_pct: mean(&returns).unwrap_or_default(),
            average_volume_ratio: mean(&ratios).unwrap_or_default(),
            return_std_dev: sample_std_dev(&returns),
            best_return_pct: max(&returns),
            worst_return_pct: min(&returns),
            average_win_pct: mean(&win_returns),
            average_loss_pct: mean(&loss_returns),
            max_volume_ratio: max(&ratios),
            min_volume_ratio: min(&ratios),
            volume_ratio_std_dev: sample_std_dev(&ratios),
            average_price_change_pct: mean(&changes).unwrap_or_default(),
            max_price_change_pct: max(&changes),
            min_price_change_pct: min(&changes),
            first_signal: first.date,
            last_signal: last.date,
            days_spanned: (last.date - first.date).num_days(),
            average_days_between_signals: mean(&gaps),
        })
    }

    /// Number of finalized signals (zero for an empty set).
    pub fn signal_count(&self) -> usize {
        match self {
            SignalSummary::EmptySignalSet { .. } => 0,
            SignalSummary::Signals(stats) => stats.signal_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SignalSummary::EmptySignalSet { .. })
    }

    pub fn stats(&self) -> Option<&SignalStats> {
        match self {
            SignalSummary::EmptySignalSet { .. } => None,
            SignalSummary::Signals(stats) => Some(stats),
        }
    }
}

fn returns_with(signals: &[BreakoutSignal], outcome: Outcome) -> Vec<f64> {
    signals
        .iter()
        .filter(|s| s.outcome == outcome)
        .map(|s| s.forward_return_pct)
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}
