//! Common Utilities
//!
//! Shared error types, path helpers and time helpers used across the crate.

pub mod error;
pub mod paths;
pub mod result;
pub mod time;

pub use error::IndexError;
pub use paths::{default_settings_path, nodeconf_dir, SETTINGS_ENV};
pub use result::IndexResult;
pub use time::{from_unix_time, to_unix_time};
