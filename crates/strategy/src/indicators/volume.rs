/// Trailing simple moving average of volume.
///
/// The average for bar `i` covers the `lookback` bars strictly before it, so a
/// spike never dilutes its own baseline. Bars with fewer than `lookback`
/// predecessors have no average.
#[derive(Debug, Clone)]
pub struct VolumeAverage {
    pub lookback: usize,
}

impl VolumeAverage {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 1, "Volume lookback must be >= 1");
        Self { lookback }
    }

    /// Compute the trailing average for every bar (oldest first).
    ///
    /// Single pass over a fixed-width window. The running sum is kept as an
    /// integer so the result does not depend on accumulated rounding.
    pub fn compute(&self, volumes: &[u64]) -> Vec<Option<f64>> {
        let mut averages = Vec::with_capacity(volumes.len());
        let mut window_sum: u128 = 0;

        for (i, &volume) in volumes.iter().enumerate() {
            if i >= self.lookback {
                averages.push(Some(window_sum as f64 / self.lookback as f64));
                window_sum -= u128::from(volumes[i - self.lookback]);
            } else {
                averages.push(None);
            }
            window_sum += u128::from(volume);
        }

        averages
    }
}

/// Ratio of a bar's volume to its trailing average.
/// Undefined when the average is zero.
pub fn volume_ratio(volume: u64, average: f64) -> Option<f64> {
    if average > 0.0 {
        Some(volume as f64 / average)
    } else {
        None
    }
}
