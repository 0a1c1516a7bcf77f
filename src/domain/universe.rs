//! Per-date universe resolution.
//!
//! [`UniverseResolver`] answers "which symbols are in the universe on this
//! date" from a remote feed. In live mode every call fetches today's payload
//! afresh. In historical mode the whole feed is fetched once, cached, and
//! every later call is a cache lookup.

use crate::domain::cache::FeedCache;
use crate::domain::error::FeedError;
use crate::domain::feed::{self, FeedMode};
use crate::ports::feed_port::FeedPort;
use chrono::NaiveDate;
use tracing::{debug, info};

/// Outcome of a universe query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniverseResult {
    /// The universe for the date. May be empty: zero symbols today.
    Symbols(Vec<String>),
    /// No information for the date; keep the previously resolved universe.
    Unchanged,
}

impl UniverseResult {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, UniverseResult::Unchanged)
    }

    pub fn symbols(&self) -> Option<&[String]> {
        match self {
            UniverseResult::Symbols(s) => Some(s.as_slice()),
            UniverseResult::Unchanged => None,
        }
    }
}

/// Feed locations for each mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedUrls {
    pub live: String,
    pub historical: String,
}

impl FeedUrls {
    pub fn for_mode(&self, mode: FeedMode) -> &str {
        match mode {
            FeedMode::Live => &self.live,
            FeedMode::Historical => &self.historical,
        }
    }
}

pub struct UniverseResolver<F: FeedPort> {
    feed: F,
    mode: FeedMode,
    urls: FeedUrls,
    cache: FeedCache,
}

impl<F: FeedPort> UniverseResolver<F> {
    /// The mode is fixed for the resolver's lifetime.
    pub fn new(feed: F, mode: FeedMode, urls: FeedUrls) -> Self {
        Self {
            feed,
            mode,
            urls,
            cache: FeedCache::new(),
        }
    }

    pub fn mode(&self) -> FeedMode {
        self.mode
    }

    pub fn cache(&self) -> &FeedCache {
        &self.cache
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn resolve_for_date(&mut self, date: NaiveDate) -> Result<UniverseResult, FeedError> {
        match self.mode {
            FeedMode::Live => self.resolve_live(date),
            FeedMode::Historical => self.resolve_historical(date),
        }
    }

    fn resolve_live(&self, date: NaiveDate) -> Result<UniverseResult, FeedError> {
        let url = self.urls.for_mode(FeedMode::Live);
        let raw = self.feed.fetch(url)?;
        debug!(%date, bytes = raw.len(), "fetched live feed");

        Ok(match feed::parse_live(&raw, date)? {
            Some(record) => UniverseResult::Symbols(record.symbols),
            None => UniverseResult::Unchanged,
        })
    }

    fn resolve_historical(&mut self, date: NaiveDate) -> Result<UniverseResult, FeedError> {
        if !self.cache.is_populated() {
            self.populate_cache()?;
        }

        Ok(match self.cache.get(date) {
            Some(symbols) => UniverseResult::Symbols(symbols.to_vec()),
            None => {
                debug!(%date, "no historical record, universe unchanged");
                UniverseResult::Unchanged
            }
        })
    }

    // Errors leave the cache unpopulated; nothing is partially loaded.
    fn populate_cache(&mut self) -> Result<(), FeedError> {
        let url = self.urls.for_mode(FeedMode::Historical);
        let raw = self.feed.fetch(url)?;
        let records = feed::parse_historical(&raw)?;
        let lines = records.len();

        self.cache.populate(records);
        match self.cache.date_range() {
            Some((first, last)) => info!(
                lines,
                dates = self.cache.len(),
                %first,
                %last,
                "historical universe cached"
            ),
            None => info!(lines, "historical feed has no records"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    struct ScriptedFeed {
        responses: RefCell<Vec<Result<String, FeedError>>>,
        calls: Cell<usize>,
        urls: RefCell<Vec<String>>,
    }

    impl ScriptedFeed {
        fn new(responses: Vec<Result<String, FeedError>>) -> Self {
            Self {
                responses: RefCell::new(responses),
                calls: Cell::new(0),
                urls: RefCell::new(Vec::new()),
            }
        }
    }

    impl FeedPort for ScriptedFeed {
        fn fetch(&self, url: &str) -> Result<String, FeedError> {
            self.calls.set(self.calls.get() + 1);
            self.urls.borrow_mut().push(url.to_string());
            self.responses.borrow_mut().remove(0)
        }
    }

    fn urls() -> FeedUrls {
        FeedUrls {
            live: "https://feed.test/live".into(),
            historical: "https://feed.test/history".into(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn live_returns_payload_symbols() {
        let feed = ScriptedFeed::new(vec![Ok("AAPL,MSFT".into())]);
        let mut resolver = UniverseResolver::new(feed, FeedMode::Live, urls());

        let result = resolver.resolve_for_date(d(2024, 5, 1)).unwrap();
        assert_eq!(
            result,
            UniverseResult::Symbols(vec!["AAPL".into(), "MSFT".into()])
        );
        assert_eq!(resolver.feed().urls.borrow()[0], "https://feed.test/live");
    }

    #[test]
    fn live_empty_payload_is_unchanged() {
        let feed = ScriptedFeed::new(vec![Ok(String::new())]);
        let mut resolver = UniverseResolver::new(feed, FeedMode::Live, urls());
        assert!(resolver.resolve_for_date(d(2024, 5, 1)).unwrap().is_unchanged());
    }

    #[test]
    fn live_fetches_every_call_and_never_caches() {
        let feed = ScriptedFeed::new(vec![Ok("AAPL".into()), Ok("MSFT".into())]);
        let mut resolver = UniverseResolver::new(feed, FeedMode::Live, urls());

        resolver.resolve_for_date(d(2024, 5, 1)).unwrap();
        let second = resolver.resolve_for_date(d(2024, 5, 2)).unwrap();

        assert_eq!(second, UniverseResult::Symbols(vec!["MSFT".into()]));
        assert_eq!(resolver.feed().calls.get(), 2);
        assert!(!resolver.cache().is_populated());
    }

    #[test]
    fn historical_fetches_once() {
        let feed = ScriptedFeed::new(vec![Ok(
            "\"2018-01-01\",AAPL,MSFT\n\"2018-01-02\",GOOG\n".into(),
        )]);
        let mut resolver = UniverseResolver::new(feed, FeedMode::Historical, urls());

        for _ in 0..3 {
            resolver.resolve_for_date(d(2018, 1, 1)).unwrap();
            resolver.resolve_for_date(d(2018, 1, 2)).unwrap();
            resolver.resolve_for_date(d(2018, 1, 3)).unwrap();
        }

        assert_eq!(resolver.feed().calls.get(), 1);
        assert_eq!(resolver.feed().urls.borrow()[0], "https://feed.test/history");
    }

    #[test]
    fn historical_miss_is_unchanged_and_hit_is_list() {
        let feed = ScriptedFeed::new(vec![Ok("2018-01-01,AAPL\n2018-01-02\n".into())]);
        let mut resolver = UniverseResolver::new(feed, FeedMode::Historical, urls());

        assert_eq!(
            resolver.resolve_for_date(d(2018, 1, 1)).unwrap(),
            UniverseResult::Symbols(vec!["AAPL".into()])
        );
        assert_eq!(
            resolver.resolve_for_date(d(2018, 1, 2)).unwrap(),
            UniverseResult::Symbols(vec![])
        );
        assert_eq!(
            resolver.resolve_for_date(d(2018, 1, 3)).unwrap(),
            UniverseResult::Unchanged
        );
    }

    #[test]
    fn historical_parse_failure_propagates_and_cache_stays_empty() {
        let feed = ScriptedFeed::new(vec![
            Ok("2018-01-01,AAPL\nnot-a-date,MSFT\n".into()),
            Ok("2018-01-01,AAPL\n".into()),
        ]);
        let mut resolver = UniverseResolver::new(feed, FeedMode::Historical, urls());

        let err = resolver.resolve_for_date(d(2018, 1, 1)).unwrap_err();
        assert!(matches!(err, FeedError::DateParse { line: 2, .. }));
        assert!(!resolver.cache().is_populated());

        let retry = resolver.resolve_for_date(d(2018, 1, 1)).unwrap();
        assert_eq!(retry, UniverseResult::Symbols(vec!["AAPL".into()]));
        assert_eq!(resolver.feed().calls.get(), 2);
    }

    #[test]
    fn network_error_propagates() {
        let feed = ScriptedFeed::new(vec![Err(FeedError::Network {
            url: "https://feed.test/live".into(),
            reason: "HTTP 503".into(),
        })]);
        let mut resolver = UniverseResolver::new(feed, FeedMode::Live, urls());
        let err = resolver.resolve_for_date(d(2024, 5, 1)).unwrap_err();
        assert!(matches!(err, FeedError::Network { .. }));
    }

    #[test]
    fn universe_result_accessors() {
        let result = UniverseResult::Symbols(vec!["SPY".into()]);
        assert_eq!(result.symbols(), Some(&["SPY".to_string()][..]));
        assert!(!result.is_unchanged());
        assert_eq!(UniverseResult::Unchanged.symbols(), None);
    }
}
