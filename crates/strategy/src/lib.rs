pub mod config;
pub mod indicators;
pub mod scanner;
pub mod summary;

pub use config::{Bounds, ParamLimits, ScanFileConfig};
pub use scanner::{scan, BarMetrics, BreakoutScanner, ScanReport};
pub use summary::{SignalStats, SignalSummary};
