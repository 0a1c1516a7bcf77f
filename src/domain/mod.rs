//! Core domain types and logic.

pub mod feed;
pub mod cache;
pub mod universe;
pub mod changes;
pub mod selection;
pub mod rotation;
pub mod replay;
pub mod config_validation;
pub mod error;
