//! Remote symbol feed port trait.

use crate::domain::error::FeedError;

/// Fetches the raw text of a symbol feed.
///
/// Implementations make a single attempt. Transport failures and non-success
/// responses are `FeedError::Network`; a body that is not text is
/// `FeedError::Format`.
pub trait FeedPort {
    fn fetch(&self, url: &str) -> Result<String, FeedError>;
}

impl<T: FeedPort + ?Sized> FeedPort for &T {
    fn fetch(&self, url: &str) -> Result<String, FeedError> {
        (**self).fetch(url)
    }
}

impl<T: FeedPort + ?Sized> FeedPort for Box<T> {
    fn fetch(&self, url: &str) -> Result<String, FeedError> {
        (**self).fetch(url)
    }
}
