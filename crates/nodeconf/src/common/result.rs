//! Common Result Type
//!
//! Type alias for index results.

use super::error::IndexError;

/// Result type used by every fallible operation in the crate.
pub type IndexResult<T> = Result<T, IndexError>;
