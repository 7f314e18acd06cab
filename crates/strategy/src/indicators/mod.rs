pub mod price_change;
pub mod volume;

pub use price_change::{pct_change, price_changes};
pub use volume::{volume_ratio, VolumeAverage};
