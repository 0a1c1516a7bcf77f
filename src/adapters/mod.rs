//! Concrete adapter implementations for ports.

pub mod csv_price_adapter;
pub mod file_config_adapter;
pub mod file_feed_adapter;
#[cfg(feature = "http")]
pub mod http_feed_adapter;
