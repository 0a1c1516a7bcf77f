//! Port traits the domain depends on.

pub mod config_port;
pub mod feed_port;
pub mod price_port;
