//! HTTPS feed adapter.
//!
//! One blocking GET per fetch, no retries and no authentication. The client
//! has no timeout unless one is configured.

use crate::domain::error::FeedError;
use crate::domain::feed::decode_payload;
use crate::ports::config_port::ConfigPort;
use crate::ports::feed_port::FeedPort;
use std::time::Duration;
use tracing::debug;

pub struct HttpFeedAdapter {
    client: reqwest::blocking::Client,
}

impl HttpFeedAdapter {
    pub fn new(timeout: Option<Duration>) -> Result<Self, FeedError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("symfeed/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::Network {
                url: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    /// Build from `[feed] timeout_secs`.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, FeedError> {
        let timeout = match config.get_int("feed", "timeout_secs", 0) {
            secs if secs > 0 => Some(Duration::from_secs(secs as u64)),
            _ => None,
        };
        Self::new(timeout)
    }
}

impl FeedPort for HttpFeedAdapter {
    fn fetch(&self, url: &str) -> Result<String, FeedError> {
        let network = |reason: String| FeedError::Network {
            url: url.to_string(),
            reason,
        };

        let resp = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                network(format!("request timed out: {e}"))
            } else if e.is_connect() {
                network(format!("connection failed: {e}"))
            } else {
                network(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(network(format!("HTTP {status}")));
        }

        let body = resp
            .bytes()
            .map_err(|e| network(format!("failed to read body: {e}")))?;
        debug!(url, status = status.as_u16(), bytes = body.len(), "feed fetched");
        decode_payload(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    #[test]
    fn builds_without_timeout() {
        let config = FileConfigAdapter::from_string("[feed]\n").unwrap();
        assert!(HttpFeedAdapter::from_config(&config).is_ok());
    }

    #[test]
    fn unreachable_host_is_network_error() {
        let adapter = HttpFeedAdapter::new(Some(Duration::from_secs(2))).unwrap();
        // Port 9 on localhost is the discard service and is closed almost everywhere.
        let err = adapter.fetch("http://127.0.0.1:9/feed.csv").unwrap_err();
        assert!(matches!(err, FeedError::Network { url, .. } if url == "http://127.0.0.1:9/feed.csv"));
    }

    #[test]
    fn malformed_url_is_network_error() {
        let adapter = HttpFeedAdapter::new(None).unwrap();
        let err = adapter.fetch("not a url").unwrap_err();
        assert!(matches!(err, FeedError::Network { .. }));
    }
}
