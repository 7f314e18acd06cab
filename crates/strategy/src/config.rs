use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use common::{Error, Result, ScanParams};

/// Scan defaults and the parameter ranges the dashboard accepts (TOML).
///
/// Example `config/scan.toml`:
/// ```toml
/// [defaults]
/// volume_ratio_threshold = 2.0
/// price_change_threshold_pct = 2.0
/// holding_period_days = 10
/// lookback = 20
///
/// [limits]
/// volume_ratio_threshold = { min = 1.0, max = 10.0 }
/// price_change_threshold_pct = { min = 1.0, max = 10.0 }
/// holding_period_days = { min = 1, max = 30 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScanFileConfig {
    pub defaults: ScanParams,
    #[serde(default)]
    pub limits: ParamLimits,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParamLimits {
    pub volume_ratio_threshold: Bounds<f64>,
    pub price_change_threshold_pct: Bounds<f64>,
    pub holding_period_days: Bounds<usize>,
}

/// Inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}

impl Default for ParamLimits {
    fn default() -> Self {
        Self {
            volume_ratio_threshold: Bounds { min: 1.0, max: 10.0 },
            price_change_threshold_pct: Bounds { min: 1.0, max: 10.0 },
            holding_period_days: Bounds { min: 1, max: 30 },
        }
    }
}

impl Default for ScanFileConfig {
    fn default() -> Self {
        Self {
            defaults: ScanParams::new(2.0, 2.0, 10),
            limits: ParamLimits::default(),
        }
    }
}

impl ScanFileConfig {
    /// Load from a TOML file. Panics on unreadable or invalid config.
    pub fn load(path: &str) -> Self {
        let content = std::fs::read_to_string(path).unwrap_or_else(|e| {
            panic!("Failed to read scan config at '{path}': {e}")
        });
        Self::from_toml(&content).unwrap_or_else(|e| {
            panic!("Invalid scan config at '{path}': {e}")
        })
    }

    /// Like [`load`](Self::load), but built-in defaults when the file is absent.
    pub fn load_or_default(path: &str) -> Self {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            info!(path, "Scan config not found, using built-in defaults");
            Self::default()
        }
    }

    /// Parse and check that the defaults lie inside the limits.
    pub fn from_toml(content: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        cfg.check(&cfg.defaults)
            .map_err(|e| Error::Config(format!("defaults rejected: {e}")))?;
        Ok(cfg)
    }

    /// Validate `params` and enforce the configured ranges.
    pub fn check(&self, params: &ScanParams) -> Result<()> {
        params.validate()?;
        let limits = &self.limits;
        if !limits.volume_ratio_threshold.contains(params.volume_ratio_threshold) {
            return Err(out_of_range(
                "volume ratio threshold",
                params.volume_ratio_threshold,
                limits.volume_ratio_threshold,
            ));
        }
        if !limits.price_change_threshold_pct.contains(params.price_change_threshold_pct) {
            return Err(out_of_range(
                "price change threshold",
                params.price_change_threshold_pct,
                limits.price_change_threshold_pct,
            ));
        }
        if !limits.holding_period_days.contains(params.holding_period_days) {
            return Err(out_of_range(
                "holding period",
                params.holding_period_days,
                limits.holding_period_days,
            ));
        }
        Ok(())
    }
}

fn out_of_range<T: std::fmt::Display>(name: &str, value: T, bounds: Bounds<T>) -> Error {
    Error::InvalidParameters(format!(
        "{name} {value} outside allowed range {}..={}",
        bounds.min, bounds.max
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [defaults]
        volume_ratio_threshold = 2.5
        price_change_threshold_pct = 3.0
        holding_period_days = 5

        [limits]
        volume_ratio_threshold = { min = 1.0, max = 5.0 }
        price_change_threshold_pct = { min = 0.5, max = 8.0 }
        holding_period_days = { min = 1, max = 20 }
    "#;

    #[test]
    fn parses_defaults_and_limits() {
        let cfg = ScanFileConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(cfg.defaults.volume_ratio_threshold, 2.5);
        assert_eq!(cfg.defaults.holding_period_days, 5);
        assert_eq!(cfg.defaults.lookback, ScanParams::DEFAULT_LOOKBACK);
        assert_eq!(cfg.limits.holding_period_days.max, 20);
    }

    #[test]
    fn limits_are_optional() {
        let cfg = ScanFileConfig::from_toml(
            "[defaults]\nvolume_ratio_threshold = 2.0\nprice_change_threshold_pct = 2.0\nholding_period_days = 10\n",
        )
        .unwrap();
        assert_eq!(cfg.limits, ParamLimits::default());
    }

    #[test]
    fn defaults_outside_limits_are_rejected() {
        let bad = SAMPLE.replace("holding_period_days = 5", "holding_period_days = 25");
        assert!(matches!(ScanFileConfig::from_toml(&bad), Err(Error::Config(_))));
    }

    #[test]
    fn check_enforces_ranges() {
        let cfg = ScanFileConfig::default();
        assert!(cfg.check(&ScanParams::new(2.0, 2.0, 10)).is_ok());
        assert!(cfg.check(&ScanParams::new(10.0, 1.0, 30)).is_ok());
        assert!(matches!(
            cfg.check(&ScanParams::new(12.0, 2.0, 10)),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            cfg.check(&ScanParams::new(2.0, 2.0, 31)),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            cfg.check(&ScanParams::new(2.0, -2.0, 10)),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn bundled_config_is_valid() {
        let content = include_str!("../../../config/scan.toml");
        let cfg = ScanFileConfig::from_toml(content).unwrap();
        assert_eq!(cfg, ScanFileConfig::default());
    }
}
