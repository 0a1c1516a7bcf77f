//! Local file feed adapter, for offline replays.

use crate::domain::error::FeedError;
use crate::domain::feed::decode_payload;
use crate::ports::feed_port::FeedPort;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads feeds from `file://` URLs or plain paths, relative paths resolved
/// against `base_dir`.
#[derive(Debug, Clone, Default)]
pub struct FileFeedAdapter {
    base_dir: Option<PathBuf>,
}

impl FileFeedAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            base_dir: Some(base_dir),
        }
    }

    /// True if `url` should be read from disk rather than over HTTP.
    pub fn handles(url: &str) -> bool {
        url.starts_with("file://") || !url.contains("://")
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl FeedPort for FileFeedAdapter {
    fn fetch(&self, url: &str) -> Result<String, FeedError> {
        let path = self.resolve(url);
        let bytes = fs::read(&path).map_err(|e| FeedError::Network {
            url: url.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        decode_payload(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn handles_file_urls_and_paths() {
        assert!(FileFeedAdapter::handles("file:///tmp/feed.csv"));
        assert!(FileFeedAdapter::handles("data/feed.csv"));
        assert!(!FileFeedAdapter::handles("https://example.com/feed.csv"));
    }

    #[test]
    fn reads_file_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.csv");
        fs::write(&path, "2018-01-01,AAPL\n").unwrap();

        let adapter = FileFeedAdapter::new();
        let text = adapter.fetch(&format!("file://{}", path.display())).unwrap();
        assert_eq!(text, "2018-01-01,AAPL\n");
    }

    #[test]
    fn relative_paths_use_base_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("live.csv"), "SPY,QQQ").unwrap();

        let adapter = FileFeedAdapter::with_base_dir(dir.path().to_path_buf());
        assert_eq!(adapter.fetch("live.csv").unwrap(), "SPY,QQQ");
    }

    #[test]
    fn missing_file_is_network_error() {
        let adapter = FileFeedAdapter::new();
        let err = adapter.fetch("/nonexistent/feed.csv").unwrap_err();
        assert!(matches!(err, FeedError::Network { .. }));
    }

    #[test]
    fn binary_file_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feed.bin");
        fs::write(&path, [0xffu8, 0xfe, 0x00, 0x81]).unwrap();

        let err = FileFeedAdapter::new()
            .fetch(path.to_str().unwrap())
            .unwrap_err();
        assert!(matches!(err, FeedError::Format { .. }));
    }
}
