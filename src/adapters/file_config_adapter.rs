//! INI file configuration adapter.
//!
//! ```ini
//! [feed]
//! mode = historical
//! live_url = https://example.com/universe/live.csv
//! historical_url = https://example.com/universe/history.csv
//!
//! [replay]
//! start_date = 2010-01-01
//! end_date = 2018-01-01
//! prices_dir = data/prices
//! ```

use crate::domain::error::FeedError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FeedError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| FeedError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, FeedError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| FeedError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}
