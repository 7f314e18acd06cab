use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Number of Monday-to-Friday days in `start..=end`.
///
/// Approximates exchange trading days for request validation; holidays are
/// not known here.
pub fn weekdays_between(start: NaiveDate, end: NaiveDate) -> usize {
    if end < start {
        return 0;
    }
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .count()
}

/// Last calendar day to fetch so a signal on `end` can still complete a
/// holding period of `holding_period_days` trading days.
///
/// Trading days are stretched to calendar days at 7/5 plus a holiday buffer.
pub fn fetch_end(end: NaiveDate, holding_period_days: usize) -> NaiveDate {
    const HOLIDAY_BUFFER_DAYS: i64 = 5;
    let trading = holding_period_days as i64;
    let calendar = (trading * 7 + 4) / 5;
    end + Duration::days(calendar + HOLIDAY_BUFFER_DAYS)
}
