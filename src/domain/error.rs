//! Domain error types.

/// Top-level error type for symfeed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("feed format error: {reason}")]
    Format { reason: String },

    #[error("invalid date {value:?} on line {line} (expected YYYY-MM-DD)")]
    DateParse { line: usize, value: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("price data error for {code}: {reason}")]
    Price { code: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FeedError {
    /// True for the three feed failures that are fatal to a resolve call.
    pub fn is_feed_failure(&self) -> bool {
        matches!(
            self,
            FeedError::Network { .. } | FeedError::Format { .. } | FeedError::DateParse { .. }
        )
    }
}

impl From<&FeedError> for std::process::ExitCode {
    fn from(err: &FeedError) -> Self {
        let code: u8 = match err {
            FeedError::Io(_) => 1,
            FeedError::ConfigParse { .. }
            | FeedError::ConfigMissing { .. }
            | FeedError::ConfigInvalid { .. } => 2,
            FeedError::Network { .. } => 3,
            FeedError::Format { .. } | FeedError::DateParse { .. } => 4,
            FeedError::Price { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
