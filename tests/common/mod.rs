#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use symfeed::domain::error::FeedError;
use symfeed::domain::feed::FeedMode;
use symfeed::domain::universe::{FeedUrls, UniverseResolver};
use symfeed::ports::feed_port::FeedPort;
use symfeed::ports::price_port::PricePort;

pub const LIVE_URL: &str = "https://feed.test/live.csv";
pub const HISTORICAL_URL: &str = "https://feed.test/history.csv";

/// Serves fixed bodies per URL and counts fetches.
pub struct MockFeedPort {
    pub bodies: HashMap<String, String>,
    pub errors: HashMap<String, String>,
    pub fetches: Cell<usize>,
    pub fetched_urls: RefCell<Vec<String>>,
}

impl MockFeedPort {
    pub fn new() -> Self {
        Self {
            bodies: HashMap::new(),
            errors: HashMap::new(),
            fetches: Cell::new(0),
            fetched_urls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_body(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }

    pub fn with_error(mut self, url: &str, reason: &str) -> Self {
        self.errors.insert(url.to_string(), reason.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl FeedPort for MockFeedPort {
    fn fetch(&self, url: &str) -> Result<String, FeedError> {
        self.fetches.set(self.fetches.get() + 1);
        self.fetched_urls.borrow_mut().push(url.to_string());
        if let Some(reason) = self.errors.get(url) {
            return Err(FeedError::Network {
                url: url.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.bodies.get(url).cloned().unwrap_or_default())
    }
}

pub struct MockPricePort {
    pub prices: HashMap<(String, NaiveDate), f64>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
        }
    }

    /// Same close for `code` on every date in `dates`.
    pub fn with_price(mut self, code: &str, dates: &[NaiveDate], close: f64) -> Self {
        for d in dates {
            self.prices.insert((code.to_string(), *d), close);
        }
        self
    }
}

impl PricePort for MockPricePort {
    fn close_prices(
        &self,
        codes: &[String],
        date: NaiveDate,
    ) -> Result<Vec<(String, f64)>, FeedError> {
        Ok(codes
            .iter()
            .filter_map(|c| self.prices.get(&(c.clone(), date)).map(|p| (c.clone(), *p)))
            .collect())
    }
}

pub fn urls() -> FeedUrls {
    FeedUrls {
        live: LIVE_URL.to_string(),
        historical: HISTORICAL_URL.to_string(),
    }
}

pub fn historical_resolver(body: &str) -> UniverseResolver<MockFeedPort> {
    UniverseResolver::new(
        MockFeedPort::new().with_body(HISTORICAL_URL, body),
        FeedMode::Historical,
        urls(),
    )
}

pub fn live_resolver(body: &str) -> UniverseResolver<MockFeedPort> {
    UniverseResolver::new(
        MockFeedPort::new().with_body(LIVE_URL, body),
        FeedMode::Live,
        urls(),
    )
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn syms(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub const SAMPLE_HISTORY: &str = "\"2018-01-01\",\"AAPL\",\"MSFT\",\"GOOG\"\n\
\"2018-01-02\",\"AAPL\",\"MSFT\"\n\
\"2018-01-04\"\n\
\"2018-01-05\",\"IBM\",\"AAPL\"\n";
