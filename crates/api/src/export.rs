use std::io;

use common::{BreakoutSignal, Error, Result};

const HEADER: [&str; 10] = [
    "Signal_Date",
    "Entry_Price",
    "Volume",
    "Volume_MA",
    "Volume_Ratio",
    "Price_Change_Pct",
    "Forward_Return",
    "Exit_Date",
    "Exit_Price",
    "Outcome",
];

/// Render finalized signals as CSV, one row per signal.
/// Ratios and percentages are rounded to two decimals.
pub fn signals_csv(signals: &[BreakoutSignal]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for s in signals {
        writer.write_record([
            s.date.to_string(),
            s.entry_price.to_string(),
            s.volume.to_string(),
            format!("{:.2}", s.volume_ma),
            format!("{:.2}", s.volume_ratio),
            format!("{:.2}", s.price_change_pct),
            format!("{:.2}", s.forward_return_pct),
            s.exit_date.to_string(),
            s.exit_price.to_string(),
            s.outcome.to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Download file name for a ticker's report.
pub fn report_file_name(ticker: &str) -> String {
    format!("{ticker}_breakout_report.csv")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use common::Outcome;

    use super::*;

    #[test]
    fn empty_export_still_has_header() {
        let csv = signals_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("Signal_Date,Entry_Price,Volume,"));
    }

    #[test]
    fn rows_are_rounded() {
        let signal = BreakoutSignal {
            date: NaiveDate::from_ymd_opt(2024, 2, 22).unwrap(),
            close: 785.38,
            volume: 86_510_000,
            volume_ma: 43_221_456.789,
            volume_ratio: 2.001_586,
            price_change_pct: 16.400_91,
            entry_price: 785.38,
            exit_date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            exit_price: 926.69,
            forward_return_pct: 17.992_564,
            outcome: Outcome::Win,
        };
        let csv = signals_csv(&[signal]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "2024-02-22,785.38,86510000,43221456.79,2.00,16.40,17.99,2024-03-07,926.69,win"
        );
    }

    #[test]
    fn file_name_uses_ticker() {
        assert_eq!(report_file_name("NVDA"), "NVDA_breakout_report.csv");
    }
}
