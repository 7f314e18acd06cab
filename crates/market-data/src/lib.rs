pub mod calendar;
pub mod clean;
pub mod yahoo;

pub use calendar::{fetch_end, weekdays_between};
pub use clean::{clean_bars, RawBar};
pub use yahoo::YahooClient;
