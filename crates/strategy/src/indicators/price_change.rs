/// Close-to-close percent change for every bar (oldest first).
///
/// The first bar has no predecessor, and a non-positive previous close makes
/// the change undefined.
pub fn price_changes(closes: &[f64]) -> Vec<Option<f64>> {
    let mut changes = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return changes;
    }
    changes.push(None);
    changes.extend(closes.windows(2).map(|w| pct_change(w[0], w[1])));
    changes
}

/// Percent change from `from` to `to`.
pub fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from > 0.0 && from.is_finite() && to.is_finite() {
        Some((to - from) / from * 100.0)
    } else {
        None
    }
}
