use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One trading day of price and volume data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Parameters of a single breakout scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanParams {
    /// Minimum ratio of the day's volume to its trailing average.
    pub volume_ratio_threshold: f64,
    /// Minimum close-to-close change, in percent.
    pub price_change_threshold_pct: f64,
    /// Trading days between entry and exit.
    pub holding_period_days: usize,
    /// Width of the trailing volume window.
    #[serde(default = "ScanParams::default_lookback")]
    pub lookback: usize,
}

impl ScanParams {
    pub const DEFAULT_LOOKBACK: usize = 20;

    pub fn new(
        volume_ratio_threshold: f64,
        price_change_threshold_pct: f64,
        holding_period_days: usize,
    ) -> Self {
        Self {
            volume_ratio_threshold,
            price_change_threshold_pct,
            holding_period_days,
            lookback: Self::DEFAULT_LOOKBACK,
        }
    }

    fn default_lookback() -> usize {
        Self::DEFAULT_LOOKBACK
    }

    /// Bars needed before the first bar becomes eligible for flagging.
    pub fn min_bars(&self) -> usize {
        self.lookback + 1
    }

    /// Reject non-positive or non-finite thresholds and empty windows.
    pub fn validate(&self) -> Result<()> {
        if !(self.volume_ratio_threshold.is_finite() && self.volume_ratio_threshold > 0.0) {
            return Err(Error::InvalidParameters(format!(
                "volume ratio threshold must be positive, got {}",
                self.volume_ratio_threshold
            )));
        }
        if !(self.price_change_threshold_pct.is_finite() && self.price_change_threshold_pct > 0.0) {
            return Err(Error::InvalidParameters(format!(
                "price change threshold must be positive, got {}",
                self.price_change_threshold_pct
            )));
        }
        if self.holding_period_days < 1 {
            return Err(Error::InvalidParameters(
                "holding period must be at least 1 trading day".to_string(),
            ));
        }
        if self.lookback < 1 {
            return Err(Error::InvalidParameters(
                "volume lookback must be at least 1 bar".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of holding a breakout position for the full period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    /// Positive returns win; flat and negative returns lose.
    pub fn from_return(forward_return_pct: f64) -> Self {
        if forward_return_pct > 0.0 {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win => write!(f, "win"),
            Outcome::Loss => write!(f, "loss"),
        }
    }
}

/// A finalized breakout: flagged and held for the full holding period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutSignal {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
    /// Trailing volume average the ratio was measured against.
    pub volume_ma: f64,
    pub volume_ratio: f64,
    pub price_change_pct: f64,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub forward_return_pct: f64,
    pub outcome: Outcome,
}

/// A bar that met the breakout condition, finalized or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedBar {
    /// Position in the scanned series.
    pub index: usize,
    pub date: NaiveDate,
    pub volume_ratio: f64,
    pub price_change_pct: f64,
    /// False when the series ends before the holding period completes.
    pub finalized: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_need_21_bars() {
        let params = ScanParams::new(2.0, 2.0, 10);
        assert_eq!(params.lookback, 20);
        assert_eq!(params.min_bars(), 21);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn non_positive_fields_are_rejected() {
        let cases = [
            ScanParams::new(0.0, 2.0, 10),
            ScanParams::new(-1.5, 2.0, 10),
            ScanParams::new(2.0, 0.0, 10),
            ScanParams::new(2.0, -3.0, 10),
            ScanParams::new(2.0, 2.0, 0),
            ScanParams::new(f64::NAN, 2.0, 10),
            ScanParams { lookback: 0, ..ScanParams::new(2.0, 2.0, 10) },
        ];
        for params in cases {
            assert!(
                matches!(params.validate(), Err(Error::InvalidParameters(_))),
                "expected rejection for {params:?}"
            );
        }
    }

    #[test]
    fn flat_return_is_a_loss() {
        assert_eq!(Outcome::from_return(0.0), Outcome::Loss);
        assert_eq!(Outcome::from_return(-0.01), Outcome::Loss);
        assert_eq!(Outcome::from_return(0.01), Outcome::Win);
    }

    #[test]
    fn lookback_defaults_when_absent_from_json() {
        let params: ScanParams = serde_json::from_str(
            r#"{"volume_ratio_threshold":2.5,"price_change_threshold_pct":3.0,"holding_period_days":5}"#,
        )
        .unwrap();
        assert_eq!(params.lookback, ScanParams::DEFAULT_LOOKBACK);
    }
}
