use chrono::NaiveDate;

use common::Bar;

/// A daily row as delivered by a data source, any field possibly missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Turn raw rows into an ordered, gap-filled bar series.
///
/// Rows are sorted by date and duplicate dates keep their first row. Missing
/// fields are forward-filled from the previous row; rows that still have a
/// hole (leading rows with no history) are dropped. NaN and negative values
/// count as missing.
pub fn clean_bars(mut rows: Vec<RawBar>) -> Vec<Bar> {
    rows.sort_by_key(|r| r.date);
    rows.dedup_by_key(|r| r.date);

    let mut last = RawBar::default();
    let mut bars = Vec::with_capacity(rows.len());

    for row in rows {
        last = RawBar {
            date: row.date,
            open: valid(row.open).or(last.open),
            high: valid(row.high).or(last.high),
            low: valid(row.low).or(last.low),
            close: valid(row.close).or(last.close),
            volume: valid(row.volume).or(last.volume),
        };

        if let (Some(open), Some(high), Some(low), Some(close), Some(volume)) =
            (last.open, last.high, last.low, last.close, last.volume)
        {
            bars.push(Bar {
                date: last.date,
                open,
                high,
                low,
                close,
                volume: volume.round() as u64,
            });
        }
    }

    bars
}

fn valid(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}
