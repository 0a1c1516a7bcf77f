//! Configuration access port trait.

use crate::domain::feed;
use chrono::NaiveDate;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// `None` when the key is absent, `Some(Err(raw))` when it is not a
    /// `YYYY-MM-DD` date.
    fn get_date(&self, section: &str, key: &str) -> Option<Result<NaiveDate, String>> {
        self.get_string(section, key).map(|raw| {
            feed::parse_date(raw.trim()).ok_or(raw)
        })
    }
}
