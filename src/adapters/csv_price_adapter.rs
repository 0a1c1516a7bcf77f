//! CSV file price adapter.
//!
//! One file per symbol, `{code}.csv`, with a header row and at least `date`
//! and `close` columns (the usual `date,open,high,low,close,volume` layout
//! works). Files are read once on first use.

use crate::domain::error::FeedError;
use crate::domain::feed::DATE_FORMAT;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::warn;

type CloseSeries = BTreeMap<NaiveDate, f64>;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
    loaded: RefCell<HashMap<String, Option<CloseSeries>>>,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            loaded: RefCell::new(HashMap::new()),
        }
    }

    // Codes come from the remote feed and must stay inside `base_path`.
    fn csv_path(&self, code: &str) -> Result<PathBuf, FeedError> {
        if code.is_empty() || code.contains(['/', '\\']) || code.contains("..") {
            return Err(FeedError::Price {
                code: code.to_string(),
                reason: "symbol is not a valid file name".into(),
            });
        }
        Ok(self.base_path.join(format!("{}.csv", code)))
    }

    // `None` when the symbol has no file.
    fn load(&self, code: &str) -> Result<Option<CloseSeries>, FeedError> {
        let path = self.csv_path(code)?;
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(code, path = %path.display(), "no price file, symbol skipped");
                return Ok(None);
            }
            Err(e) => {
                return Err(FeedError::Price {
                    code: code.to_string(),
                    reason: format!("failed to read {}: {}", path.display(), e),
                })
            }
        };

        let price_err = |reason: String| FeedError::Price {
            code: code.to_string(),
            reason,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| price_err(format!("CSV header error: {}", e)))?
            .clone();
        let date_col = column(&headers, "date").unwrap_or(0);
        let close_col = column(&headers, "close").unwrap_or(4);

        let mut series = CloseSeries::new();
        for result in rdr.records() {
            let record = result.map_err(|e| price_err(format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(date_col)
                .ok_or_else(|| price_err("missing date column".into()))?;
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
                .map_err(|e| price_err(format!("invalid date format: {}", e)))?;

            let close: f64 = record
                .get(close_col)
                .ok_or_else(|| price_err("missing close column".into()))?
                .parse()
                .map_err(|e| price_err(format!("invalid close value: {}", e)))?;

            series.insert(date, close);
        }

        Ok(Some(series))
    }
}

fn column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

impl PricePort for CsvPriceAdapter {
    fn close_prices(
        &self,
        codes: &[String],
        date: NaiveDate,
    ) -> Result<Vec<(String, f64)>, FeedError> {
        let mut snapshot = Vec::with_capacity(codes.len());

        for code in codes {
            if !self.loaded.borrow().contains_key(code) {
                let series = self.load(code)?;
                self.loaded.borrow_mut().insert(code.clone(), series);
            }

            let loaded = self.loaded.borrow();
            if let Some(close) = loaded
                .get(code)
                .and_then(Option::as_ref)
                .and_then(|series| series.get(&date))
            {
                snapshot.push((code.clone(), *close));
            }
        }

        Ok(snapshot)
    }
}
