//! Configuration validation.
//!
//! Checks the `[feed]` and `[replay]` sections before any network access.

use crate::domain::error::FeedError;
use crate::domain::feed::FeedMode;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_feed_config(config: &dyn ConfigPort) -> Result<(), FeedError> {
    let mode = configured_mode(config)?;
    validate_feed_url(config, mode)?;
    validate_timeout(config)?;
    Ok(())
}

pub fn validate_replay_config(config: &dyn ConfigPort) -> Result<(), FeedError> {
    validate_replay_dates(config)?;
    validate_selection_size(config)?;
    Ok(())
}

/// The `[feed] mode` key, defaulting to historical.
pub fn configured_mode(config: &dyn ConfigPort) -> Result<FeedMode, FeedError> {
    match config.get_string("feed", "mode") {
        None => Ok(FeedMode::Historical),
        Some(raw) => raw.parse().map_err(|reason| FeedError::ConfigInvalid {
            section: "feed".to_string(),
            key: "mode".to_string(),
            reason,
        }),
    }
}

pub fn url_key(mode: FeedMode) -> &'static str {
    match mode {
        FeedMode::Live => "live_url",
        FeedMode::Historical => "historical_url",
    }
}

fn validate_feed_url(config: &dyn ConfigPort, mode: FeedMode) -> Result<(), FeedError> {
    let key = url_key(mode);
    match config.get_string("feed", key) {
        Some(url) if !url.trim().is_empty() => Ok(()),
        _ => Err(FeedError::ConfigMissing {
            section: "feed".to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), FeedError> {
    if config.get_string("feed", "timeout_secs").is_none() {
        return Ok(());
    }
    let value = config.get_int("feed", "timeout_secs", -1);
    if value < 1 {
        return Err(FeedError::ConfigInvalid {
            section: "feed".to_string(),
            key: "timeout_secs".to_string(),
            reason: "timeout_secs must be a positive integer".to_string(),
        });
    }
    Ok(())
}

fn validate_replay_dates(config: &dyn ConfigPort) -> Result<(), FeedError> {
    let start = replay_date(config, "start_date")?;
    let end = replay_date(config, "end_date")?;
    if start > end {
        return Err(FeedError::ConfigInvalid {
            section: "replay".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be on or before end_date".to_string(),
        });
    }
    Ok(())
}

pub fn replay_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, FeedError> {
    match config.get_date("replay", key) {
        None => Err(FeedError::ConfigMissing {
            section: "replay".to_string(),
            key: key.to_string(),
        }),
        Some(parsed) => parsed.map_err(|_| FeedError::ConfigInvalid {
            section: "replay".to_string(),
            key: key.to_string(),
            reason: format!("invalid {} format, expected YYYY-MM-DD", key),
        }),
    }
}

fn validate_selection_size(config: &dyn ConfigPort) -> Result<(), FeedError> {
    let value = config.get_int("replay", "selection_size", 10);
    if value < 1 {
        return Err(FeedError::ConfigInvalid {
            section: "replay".to_string(),
            key: "selection_size".to_string(),
            reason: "selection_size must be at least 1".to_string(),
        });
    }
    Ok(())
}
