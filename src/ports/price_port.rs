//! Price snapshot port trait.

use crate::domain::error::FeedError;
use chrono::NaiveDate;

pub trait PricePort {
    /// Closing prices for `codes` on `date`, in the order of `codes`.
    ///
    /// Codes with no bar on `date` are omitted rather than reported as
    /// errors; only unreadable data is an error.
    fn close_prices(
        &self,
        codes: &[String],
        date: NaiveDate,
    ) -> Result<Vec<(String, f64)>, FeedError>;
}
